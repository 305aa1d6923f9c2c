// SYNOID Highlight Selector
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Asks the model for candidates, keeps the ones that survive alignment and
// dedup, then walks the fallback ladder until the quota is met.

use super::fallback::{FallbackContext, FallbackLadder};
use super::limits::LengthLimits;
use super::overlap::OverlapPolicy;
use super::prompt::{build_request, parse_candidates, PromptInput, RawCandidate};
use super::strategy::HighlightStrategy;
use super::{Highlight, HighlightRange};
use crate::agent::gpt_oss_bridge::CompletionProvider;
use crate::agent::transcription::{sorted_segments, TranscriptBundle, TranscriptSegment};
use crate::error::HighlightError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionOptions {
    pub instructions: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
    /// Pins the exact maximum; also lowers the minimum to the floor.
    pub max_highlights: Option<usize>,
    pub exclude_ranges: Vec<HighlightRange>,
}

pub struct HighlightSelector {
    provider: Arc<dyn CompletionProvider>,
    strategy: HighlightStrategy,
    ladder: FallbackLadder,
}

impl HighlightSelector {
    pub fn new(provider: Arc<dyn CompletionProvider>, strategy: HighlightStrategy) -> Self {
        Self {
            provider,
            strategy,
            ladder: FallbackLadder::standard(),
        }
    }

    pub fn with_ladder(mut self, ladder: FallbackLadder) -> Self {
        self.ladder = ladder;
        self
    }

    pub fn strategy(&self) -> &HighlightStrategy {
        &self.strategy
    }

    /// (requested, minimum) for a call.
    pub fn counts(&self, options: &SelectionOptions) -> (usize, usize) {
        let pinned = options.max_highlights.filter(|n| *n > 0);
        let requested = pinned.unwrap_or(self.strategy.default_highlight_count).max(1);
        let minimum = match pinned {
            Some(_) => self.strategy.minimum_highlight_floor.min(requested).max(1),
            None => requested,
        };
        (requested, minimum)
    }

    pub async fn select(
        &self,
        bundle: &TranscriptBundle,
        options: &SelectionOptions,
    ) -> Result<Vec<Highlight>, HighlightError> {
        let segments = sorted_segments(&bundle.segments);
        let (requested, minimum) = self.counts(options);
        let limits =
            LengthLimits::for_highlights(&segments, options.duration_seconds, &self.strategy);
        let exclude = valid_ranges(&options.exclude_ranges);

        info!(
            "[HIGHLIGHT] Selecting {}..{} highlights from {} segments (duration: {})",
            minimum,
            requested,
            segments.len(),
            limits
                .duration
                .map_or_else(|| "unknown".to_string(), |d| format!("{:.1}s", d))
        );

        let language = options
            .language
            .as_deref()
            .or(bundle.language.as_deref());
        let request = build_request(
            &PromptInput {
                segments: &segments,
                limits: &limits,
                language,
                instructions: options.instructions.as_deref(),
                description: options.description.as_deref(),
                exclude: &exclude,
                requested,
                minimum,
            },
            &self.strategy,
        );

        let content = self.provider.complete(&request).await?;
        let candidates = parse_candidates(&content);
        info!("[HIGHLIGHT] Model proposed {} candidate(s)", candidates.len());

        self.assemble(&segments, limits, candidates, &exclude, requested, minimum)
    }

    /// Everything after the completion call: validate, dedup, filter, top up.
    pub fn assemble(
        &self,
        segments: &[TranscriptSegment],
        limits: LengthLimits,
        candidates: Vec<RawCandidate>,
        exclude: &[HighlightRange],
        requested: usize,
        minimum: usize,
    ) -> Result<Vec<Highlight>, HighlightError> {
        let ctx = FallbackContext::new(segments, limits, &self.strategy, requested);
        let precision = self.strategy.key_precision;

        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for candidate in candidates {
            let Some(highlight) =
                ctx.materialize(candidate.start, candidate.end, candidate.title.as_deref())
            else {
                continue;
            };
            if seen.insert(highlight.range().key(precision)) {
                unique.push(highlight);
            }
        }

        let mut highlights =
            OverlapPolicy::from_strategy(&self.strategy).filter_distinct(unique, exclude);
        highlights.truncate(requested);
        info!("[HIGHLIGHT] {} model highlight(s) kept", highlights.len());

        let mut taken: Vec<HighlightRange> = exclude.to_vec();
        taken.extend(highlights.iter().map(Highlight::range));
        self.ladder
            .run(&ctx, &mut highlights, &mut taken, requested, minimum);

        if highlights.is_empty() {
            warn!("[HIGHLIGHT] Every tier came back empty");
            return Err(HighlightError::NoHighlights);
        }
        if highlights.len() < minimum {
            warn!(
                "[HIGHLIGHT] Only {} of the minimum {} highlight(s) found",
                highlights.len(),
                minimum
            );
        }

        highlights.truncate(requested);
        info!("[HIGHLIGHT] ✅ Returning {} highlight(s)", highlights.len());
        Ok(highlights)
    }
}

fn valid_ranges(ranges: &[HighlightRange]) -> Vec<HighlightRange> {
    ranges.iter().copied().filter(HighlightRange::is_valid).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::gpt_oss_bridge::CompletionRequest;
    use async_trait::async_trait;

    struct Silent;

    #[async_trait]
    impl CompletionProvider for Silent {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, HighlightError> {
            Ok(String::new())
        }
    }

    fn selector() -> HighlightSelector {
        HighlightSelector::new(Arc::new(Silent), HighlightStrategy::default())
    }

    #[test]
    fn test_counts_default_and_pinned() {
        let s = selector();
        assert_eq!(s.counts(&SelectionOptions::default()), (6, 6));

        let pinned = |n| SelectionOptions {
            max_highlights: Some(n),
            ..Default::default()
        };
        assert_eq!(s.counts(&pinned(6)), (6, 4));
        assert_eq!(s.counts(&pinned(3)), (3, 3));
        assert_eq!(s.counts(&pinned(0)), (6, 6));
    }

    #[test]
    fn test_assemble_dedupes_and_keeps_titles() {
        let segments: Vec<TranscriptSegment> = (0..12)
            .map(|i| {
                TranscriptSegment::new(
                    i as f64 * 10.0,
                    (i + 1) as f64 * 10.0,
                    "We talk about something worth hearing today.",
                )
            })
            .collect();
        let s = selector();
        let limits = LengthLimits::for_highlights(&segments, None, s.strategy());
        let candidates = vec![
            RawCandidate { start: 10.0, end: 30.0, title: Some("Opening".to_string()) },
            RawCandidate { start: 10.0, end: 30.0, title: Some("Duplicate".to_string()) },
            RawCandidate { start: 60.0, end: 80.0, title: None },
        ];
        let highlights = s.assemble(&segments, limits, candidates, &[], 2, 2).unwrap();

        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[0].title.as_deref(), Some("Opening"));
        assert_eq!((highlights[1].start, highlights[1].end), (60.0, 80.0));
        assert_eq!(
            highlights[1].title.as_deref(),
            Some("We talk about something worth hearing today. We")
        );
    }

    #[test]
    fn test_empty_ladder_returns_no_highlights() {
        let segments = vec![TranscriptSegment::new(0.0, 60.0, "Plenty of words to pick from here.")];
        let s = selector().with_ladder(FallbackLadder::new(Vec::new()));
        let limits = LengthLimits::for_highlights(&segments, None, s.strategy());
        let result = s.assemble(&segments, limits, Vec::new(), &[], 3, 3);
        assert!(matches!(result, Err(HighlightError::NoHighlights)));
    }

    #[test]
    fn test_assemble_on_empty_transcript_fails() {
        let s = selector();
        let limits = LengthLimits::for_highlights(&[], None, s.strategy());
        let result = s.assemble(&[], limits, Vec::new(), &[], 6, 6);
        assert!(matches!(result, Err(HighlightError::NoHighlights)));
    }
}
