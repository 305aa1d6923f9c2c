// SYNOID Fallback Ladder
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Deterministic, non-LLM candidate generators. The selector walks them in
// order until its quota is met or the ladder runs out.

use super::aligner::align_sorted;
use super::content::{build_content_sorted, derive_title};
use super::limits::{normalize, LengthLimits};
use super::overlap::OverlapPolicy;
use super::strategy::HighlightStrategy;
use super::{Highlight, HighlightRange};
use crate::agent::transcription::{sorted_segments, TranscriptSegment};
use std::collections::HashSet;
use tracing::{debug, info};

/// Everything a tier needs to turn a raw anchor into a highlight.
pub struct FallbackContext<'a> {
    segments: Vec<TranscriptSegment>,
    pub limits: LengthLimits,
    pub strategy: &'a HighlightStrategy,
    pub target_count: usize,
}

impl<'a> FallbackContext<'a> {
    pub fn new(
        segments: &[TranscriptSegment],
        limits: LengthLimits,
        strategy: &'a HighlightStrategy,
        target_count: usize,
    ) -> Self {
        Self {
            segments: sorted_segments(segments),
            limits,
            strategy,
            target_count: target_count.max(1),
        }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn policy(&self) -> OverlapPolicy {
        OverlapPolicy::from_strategy(self.strategy)
    }

    /// Clip length the tiers aim for: short on short transcripts, never
    /// outside the limits.
    pub fn target_length(&self) -> f64 {
        let preferred = self.strategy.fallback_target_seconds;
        let base = match self.limits.duration {
            Some(d) => preferred.min(d / self.target_count as f64),
            None => preferred,
        };
        base.max(self.limits.min_length).min(self.limits.max_length)
    }

    /// Normalize, align and fill in content. `None` when the range covers
    /// no speech.
    pub fn materialize(&self, raw_start: f64, raw_end: f64, title: Option<&str>) -> Option<Highlight> {
        let normalized = normalize(raw_start, raw_end, &self.limits);
        let aligned = align_sorted(normalized.start, normalized.end, &self.segments, &self.limits);
        if !aligned.is_valid() {
            return None;
        }

        let content = build_content_sorted(&self.segments, aligned.start, aligned.end);
        if content.is_empty() {
            return None;
        }

        let title = derive_title(title, &content, self.strategy.title_word_count);
        Some(Highlight {
            start: aligned.start,
            end: aligned.end,
            content,
            title,
        })
    }
}

pub trait FallbackTier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Up to `needed` new highlights, none clashing with `exclude`.
    fn generate(
        &self,
        ctx: &FallbackContext<'_>,
        needed: usize,
        exclude: &[HighlightRange],
    ) -> Vec<Highlight>;
}

/// Running pick list that rejects anything overlapping what is taken.
struct Collector {
    policy: OverlapPolicy,
    taken: Vec<HighlightRange>,
    picked: Vec<Highlight>,
    needed: usize,
}

impl Collector {
    fn new(policy: OverlapPolicy, exclude: &[HighlightRange], needed: usize) -> Self {
        Self {
            policy,
            taken: exclude.to_vec(),
            picked: Vec::new(),
            needed,
        }
    }

    fn is_full(&self) -> bool {
        self.picked.len() >= self.needed
    }

    fn covers(&self, t: f64) -> bool {
        self.taken.iter().any(|r| r.start <= t && t < r.end)
    }

    fn offer(&mut self, candidate: Option<Highlight>) -> bool {
        let Some(highlight) = candidate else {
            return false;
        };
        if self.is_full() {
            return false;
        }
        let range = highlight.range();
        if self.taken.iter().any(|t| self.policy.is_significant(&range, t)) {
            return false;
        }
        self.taken.push(range);
        self.picked.push(highlight);
        true
    }

    fn finish(self) -> Vec<Highlight> {
        self.picked
    }
}

/// Anchors just ahead of the wordiest segments not yet covered.
#[derive(Debug, Default)]
pub struct WordDensityFallback;

impl FallbackTier for WordDensityFallback {
    fn name(&self) -> &'static str {
        "word-density"
    }

    fn generate(
        &self,
        ctx: &FallbackContext<'_>,
        needed: usize,
        exclude: &[HighlightRange],
    ) -> Vec<Highlight> {
        let mut collector = Collector::new(ctx.policy(), exclude, needed);
        let target = ctx.target_length();
        let lead_in = ctx.strategy.density_lead_in_seconds;

        let mut ranked: Vec<&TranscriptSegment> =
            ctx.segments().iter().filter(|s| s.word_count() > 0).collect();
        // Stable sort: equally dense segments stay chronological.
        ranked.sort_by(|a, b| b.word_count().cmp(&a.word_count()));

        for seg in ranked {
            if collector.is_full() {
                break;
            }
            if collector.covers((seg.start + seg.end) / 2.0) {
                continue;
            }
            let start = (seg.start - lead_in).max(0.0);
            collector.offer(ctx.materialize(start, start + target, None));
        }
        collector.finish()
    }
}

/// One anchor per equal slice of the timeline, then every segment, then
/// bare slice midpoints.
#[derive(Debug)]
pub struct BinCoverageFallback {
    /// Bins per requested highlight; 2 widens the pool on a second pass.
    pub spread: usize,
}

impl Default for BinCoverageFallback {
    fn default() -> Self {
        Self { spread: 1 }
    }
}

impl FallbackTier for BinCoverageFallback {
    fn name(&self) -> &'static str {
        if self.spread > 1 {
            "bin-coverage-wide"
        } else {
            "bin-coverage"
        }
    }

    fn generate(
        &self,
        ctx: &FallbackContext<'_>,
        needed: usize,
        exclude: &[HighlightRange],
    ) -> Vec<Highlight> {
        let Some(duration) = ctx.limits.duration else {
            return Vec::new();
        };

        let mut collector = Collector::new(ctx.policy(), exclude, needed);
        let bins = (ctx.target_count.max(needed) * self.spread.max(1)).max(1);
        let bin_width = duration / bins as f64;
        let target = ctx.target_length();
        let segs = ctx.segments();
        let mut tried = vec![false; segs.len()];

        for b in 0..bins {
            if collector.is_full() {
                break;
            }
            let bin_start = b as f64 * bin_width;
            let bin_end = bin_start + bin_width;
            let anchor = segs
                .iter()
                .position(|s| s.start >= bin_start && s.start < bin_end)
                .or_else(|| segs.iter().position(|s| s.start >= bin_start))
                .or_else(|| segs.len().checked_sub(1));
            let Some(idx) = anchor else {
                continue;
            };
            if tried[idx] {
                continue;
            }
            tried[idx] = true;
            collector.offer(ctx.materialize(segs[idx].start, segs[idx].start + target, None));
        }

        for (idx, seg) in segs.iter().enumerate() {
            if collector.is_full() {
                break;
            }
            if !tried[idx] {
                collector.offer(ctx.materialize(seg.start, seg.start + target, None));
            }
        }

        for b in 0..bins {
            if collector.is_full() {
                break;
            }
            let mid = (b as f64 + 0.5) * bin_width;
            let start = (mid - target / 2.0).max(0.0);
            collector.offer(ctx.materialize(start, start + target, None));
        }

        collector.finish()
    }
}

/// Evenly spaced anchors that must keep a gap from everything taken,
/// retried once with a smaller gap.
#[derive(Debug, Default)]
pub struct EvenTimelineFallback;

impl FallbackTier for EvenTimelineFallback {
    fn name(&self) -> &'static str {
        "even-timeline"
    }

    fn generate(
        &self,
        ctx: &FallbackContext<'_>,
        needed: usize,
        exclude: &[HighlightRange],
    ) -> Vec<Highlight> {
        let Some(duration) = ctx.limits.duration else {
            return Vec::new();
        };

        let target = ctx.target_length();
        let candidates: Vec<Option<Highlight>> =
            even_anchors(duration, target, ctx.target_count.max(needed))
                .into_iter()
                .map(|a| ctx.materialize(a, a + target, None))
                .collect();

        let cap = ctx.strategy.timeline_gap_ratio * target;
        let gaps = [
            ctx.strategy.timeline_strict_gap_seconds.min(cap),
            ctx.strategy.timeline_relaxed_gap_seconds.min(cap),
        ];

        let mut taken = exclude.to_vec();
        let mut picked: Vec<Highlight> = Vec::new();
        let mut consumed = vec![false; candidates.len()];

        for gap in gaps {
            for (i, candidate) in candidates.iter().enumerate() {
                if picked.len() >= needed {
                    break;
                }
                let Some(highlight) = candidate else {
                    continue;
                };
                if consumed[i] {
                    continue;
                }
                let range = highlight.range();
                if taken.iter().all(|t| separation(&range, t) >= gap) {
                    consumed[i] = true;
                    taken.push(range);
                    picked.push(highlight.clone());
                }
            }
        }
        picked
    }
}

/// Last resort: even spacing with no overlap check, only exact duplicates
/// are skipped.
#[derive(Debug, Default)]
pub struct ForcedTimelineFallback;

impl FallbackTier for ForcedTimelineFallback {
    fn name(&self) -> &'static str {
        "forced-timeline"
    }

    fn generate(
        &self,
        ctx: &FallbackContext<'_>,
        needed: usize,
        exclude: &[HighlightRange],
    ) -> Vec<Highlight> {
        let Some(duration) = ctx.limits.duration else {
            return Vec::new();
        };

        let precision = ctx.strategy.key_precision;
        let target = ctx.target_length();
        let count = ctx.target_count.max(needed);
        let primary = even_anchors(duration, target, count);

        // Half-step grid for when the primary one only yields seen keys.
        let step = if count > 1 {
            (duration - target).max(0.0) / (count - 1) as f64
        } else {
            target
        };
        let latest = (duration - target).max(0.0);
        let shifted = primary.iter().map(|a| (a + step / 2.0).min(latest));

        let mut seen: HashSet<(i64, i64)> = exclude.iter().map(|r| r.key(precision)).collect();
        let mut picked = Vec::new();
        for anchor in primary.iter().copied().chain(shifted) {
            if picked.len() >= needed {
                break;
            }
            if let Some(highlight) = ctx.materialize(anchor, anchor + target, None) {
                if seen.insert(highlight.range().key(precision)) {
                    picked.push(highlight);
                }
            }
        }
        picked
    }
}

/// `count` anchors spread over `[0, duration - length]`.
pub fn even_anchors(duration: f64, length: f64, count: usize) -> Vec<f64> {
    let span = (duration - length).max(0.0);
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n).map(|i| span * i as f64 / (n - 1) as f64).collect(),
    }
}

/// Seconds between two ranges; negative when they overlap.
fn separation(a: &HighlightRange, b: &HighlightRange) -> f64 {
    a.start.max(b.start) - a.end.min(b.end)
}

/// Which count a ladder step tops up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Requested,
    Minimum,
}

pub struct LadderStep {
    pub quota: Quota,
    pub tier: Box<dyn FallbackTier>,
}

impl LadderStep {
    pub fn new(quota: Quota, tier: impl FallbackTier + 'static) -> Self {
        Self {
            quota,
            tier: Box::new(tier),
        }
    }
}

pub struct FallbackLadder {
    steps: Vec<LadderStep>,
}

impl Default for FallbackLadder {
    fn default() -> Self {
        Self::standard()
    }
}

impl FallbackLadder {
    pub fn new(steps: Vec<LadderStep>) -> Self {
        Self { steps }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            LadderStep::new(Quota::Requested, WordDensityFallback),
            LadderStep::new(Quota::Requested, BinCoverageFallback::default()),
            LadderStep::new(Quota::Minimum, BinCoverageFallback { spread: 2 }),
            LadderStep::new(Quota::Minimum, EvenTimelineFallback),
            LadderStep::new(Quota::Minimum, ForcedTimelineFallback),
        ])
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.tier.name()).collect()
    }

    /// Top `highlights` up, step by step. `exclude` grows with every pick.
    pub fn run(
        &self,
        ctx: &FallbackContext<'_>,
        highlights: &mut Vec<Highlight>,
        exclude: &mut Vec<HighlightRange>,
        requested: usize,
        minimum: usize,
    ) {
        for step in &self.steps {
            let quota = match step.quota {
                Quota::Requested => requested,
                Quota::Minimum => minimum,
            };
            if highlights.len() >= quota {
                continue;
            }

            let needed = quota - highlights.len();
            let produced = step.tier.generate(ctx, needed, exclude);
            let added = produced.len().min(needed);
            info!(
                "[LADDER] {} added {}/{} highlight(s)",
                step.tier.name(),
                added,
                needed
            );

            for highlight in produced.into_iter().take(needed) {
                debug!(
                    "[LADDER] + {:.2}-{:.2} \"{}\"",
                    highlight.start,
                    highlight.end,
                    highlight.title.as_deref().unwrap_or("")
                );
                exclude.push(highlight.range());
                highlights.push(highlight);
            }
        }
    }
}
