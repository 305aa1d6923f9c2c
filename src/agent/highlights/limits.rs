// SYNOID Range Normalizer
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::strategy::HighlightStrategy;
use super::HighlightRange;
use crate::agent::transcription::{transcript_duration, TranscriptSegment};

/// Length bounds for a single call. Recomputed per invocation, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthLimits {
    pub duration: Option<f64>,
    pub min_length: f64,
    pub max_length: f64,
}

impl LengthLimits {
    pub fn new(duration: Option<f64>, min_length: f64, max_length: f64) -> Self {
        Self {
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
            min_length: min_length.min(max_length),
            max_length,
        }
    }

    /// Bounds for automatic selection (7s–45s by default), capped by the
    /// known duration.
    pub fn for_highlights(
        segments: &[TranscriptSegment],
        duration_override: Option<f64>,
        strategy: &HighlightStrategy,
    ) -> Self {
        let duration = effective_duration(segments, duration_override);
        let max_length = match duration {
            Some(d) => strategy.max_highlight_seconds.min(d),
            None => strategy.max_highlight_seconds,
        };
        Self::new(duration, strategy.min_highlight_seconds, max_length)
    }

    /// Bounds for manual edits: roughly a second minimum, the whole
    /// recording as maximum.
    pub fn for_editing(
        segments: &[TranscriptSegment],
        duration_override: Option<f64>,
        strategy: &HighlightStrategy,
    ) -> Self {
        let duration = effective_duration(segments, duration_override);
        let max_length = duration.unwrap_or(f64::INFINITY);
        Self::new(duration, strategy.editable_min_seconds, max_length)
    }

    pub fn has_duration(&self) -> bool {
        self.duration.is_some()
    }

    pub fn contains_length(&self, length: f64) -> bool {
        length.is_finite()
            && length > 0.0
            && length >= self.min_length - super::EPSILON
            && length <= self.max_length + super::EPSILON
    }
}

/// The larger of the transcript-implied duration and the caller override.
/// An override never truncates the transcript.
pub fn effective_duration(
    segments: &[TranscriptSegment],
    duration_override: Option<f64>,
) -> Option<f64> {
    let implied = transcript_duration(segments);
    let explicit = duration_override.filter(|d| d.is_finite() && *d > 0.0);
    match (implied, explicit) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Clamp a raw pair into a valid clip for `limits`.
pub fn normalize(start: f64, end: f64, limits: &LengthLimits) -> HighlightRange {
    let min = limits.min_length;
    let max = limits.max_length;

    let mut start = if start.is_finite() { start } else { 0.0 };
    let mut end = if end.is_finite() { end } else { start + min };
    if end < start {
        std::mem::swap(&mut start, &mut end);
    }

    if end - start < min {
        end = start + min;
    }
    if end - start > max {
        end = start + max;
    }

    match limits.duration {
        Some(duration) => {
            // Clamp first, then repair whichever length bound the clamp broke.
            let latest_start = (duration - min).max(0.0);
            start = start.clamp(0.0, latest_start);
            end = end.max(start + min).min(duration);
            if end - start > max {
                end = start + max;
            }
            if end - start < min {
                start = (end - min).max(0.0);
            }
        }
        None => {
            start = start.max(0.0);
            if end - start < min {
                end = start + min;
            }
        }
    }

    HighlightRange::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlight_limits(duration: Option<f64>) -> LengthLimits {
        let max = duration.map_or(45.0, |d: f64| d.min(45.0));
        LengthLimits::new(duration, 7.0, max)
    }

    fn assert_in_bounds(range: HighlightRange, limits: &LengthLimits) {
        assert!(limits.contains_length(range.length()), "{:?}", range);
        if let Some(d) = limits.duration {
            assert!(range.start >= 0.0 && range.end <= d + 1e-9, "{:?}", range);
        }
    }

    #[test]
    fn test_swaps_reversed_pair() {
        let limits = highlight_limits(Some(100.0));
        assert_eq!(normalize(30.0, 10.0, &limits), HighlightRange::new(10.0, 30.0));
    }

    #[test]
    fn test_extends_short_and_shrinks_long() {
        let limits = highlight_limits(Some(100.0));
        assert_eq!(normalize(10.0, 12.0, &limits), HighlightRange::new(10.0, 17.0));
        assert_eq!(normalize(10.0, 80.0, &limits), HighlightRange::new(10.0, 55.0));
    }

    #[test]
    fn test_pulls_start_back_near_duration_end() {
        let limits = highlight_limits(Some(60.0));
        let range = normalize(58.0, 59.0, &limits);
        assert_eq!(range, HighlightRange::new(53.0, 60.0));
    }

    #[test]
    fn test_without_duration_only_clamps_start() {
        let limits = highlight_limits(None);
        assert_eq!(normalize(-5.0, 3.0, &limits), HighlightRange::new(0.0, 7.0));
        assert_eq!(normalize(500.0, 510.0, &limits), HighlightRange::new(500.0, 510.0));
    }

    #[test]
    fn test_length_always_within_bounds() {
        let pairs = [
            (0.0, 0.0),
            (-20.0, -5.0),
            (95.0, 400.0),
            (12.5, 13.0),
            (44.0, 3.0),
            (f64::NAN, 20.0),
            (10.0, f64::INFINITY),
        ];
        for duration in [Some(8.0), Some(30.0), Some(100.0), None] {
            let limits = highlight_limits(duration);
            for (s, e) in pairs {
                assert_in_bounds(normalize(s, e, &limits), &limits);
            }
        }
    }

    #[test]
    fn test_normalize_is_idempotent_for_valid_ranges() {
        let limits = highlight_limits(Some(120.0));
        for (s, e) in [(0.0, 7.0), (10.0, 55.0), (80.5, 120.0), (33.3, 44.4)] {
            let once = normalize(s, e, &limits);
            assert_eq!(once, HighlightRange::new(s, e));
            assert_eq!(normalize(once.start, once.end, &limits), once);
        }
    }

    #[test]
    fn test_override_never_truncates_transcript() {
        let segments = vec![TranscriptSegment::new(0.0, 90.0, "long")];
        assert_eq!(effective_duration(&segments, Some(30.0)), Some(90.0));
        assert_eq!(effective_duration(&segments, Some(120.0)), Some(120.0));
        assert_eq!(effective_duration(&[], Some(f64::NAN)), None);
    }

    #[test]
    fn test_short_transcript_caps_highlight_bounds() {
        let strategy = HighlightStrategy::default();
        let segments = vec![TranscriptSegment::new(0.0, 5.0, "tiny")];
        let limits = LengthLimits::for_highlights(&segments, None, &strategy);
        assert_eq!(limits.max_length, 5.0);
        assert_eq!(limits.min_length, 5.0);
    }

    #[test]
    fn test_editing_bounds_span_whole_recording() {
        let strategy = HighlightStrategy::default();
        let segments = vec![TranscriptSegment::new(0.0, 300.0, "talk")];
        let limits = LengthLimits::for_editing(&segments, None, &strategy);
        assert_eq!(limits.min_length, 1.0);
        assert_eq!(limits.max_length, 300.0);
        assert_eq!(normalize(10.0, 10.2, &limits), HighlightRange::new(10.0, 11.0));
    }
}
