// SYNOID Segment Aligner
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Snaps a raw clip range onto transcript segment boundaries, preferring
// boundaries that close a sentence, so clips never start or stop mid-word.

use super::limits::LengthLimits;
use super::{HighlightRange, EPSILON};
use crate::agent::transcription::{sorted_segments, TranscriptSegment};
use tracing::debug;

/// Decides whether a segment's text closes a sentence. Swap in a stronger
/// tokenizer through [`align_with`].
pub type SentenceBoundary = fn(&str) -> bool;

/// Trailing `.`, `!`, `?` or an ellipsis.
pub fn ends_sentence(text: &str) -> bool {
    text.trim_end().ends_with(['.', '!', '?', '…'])
}

pub fn align(
    raw_start: f64,
    raw_end: f64,
    segments: &[TranscriptSegment],
    limits: &LengthLimits,
) -> HighlightRange {
    align_with(raw_start, raw_end, segments, limits, ends_sentence)
}

/// Best-effort alignment: returns the raw range untouched whenever no
/// aligned range fits the limits.
pub fn align_with(
    raw_start: f64,
    raw_end: f64,
    segments: &[TranscriptSegment],
    limits: &LengthLimits,
    boundary: SentenceBoundary,
) -> HighlightRange {
    let segs = sorted_segments(segments);
    align_sorted_with(raw_start, raw_end, &segs, limits, boundary)
}

/// [`align`] over segments already ordered by [`sorted_segments`].
pub(crate) fn align_sorted(
    raw_start: f64,
    raw_end: f64,
    segs: &[TranscriptSegment],
    limits: &LengthLimits,
) -> HighlightRange {
    align_sorted_with(raw_start, raw_end, segs, limits, ends_sentence)
}

fn align_sorted_with(
    raw_start: f64,
    raw_end: f64,
    segs: &[TranscriptSegment],
    limits: &LengthLimits,
    boundary: SentenceBoundary,
) -> HighlightRange {
    let raw = HighlightRange::new(raw_start, raw_end);
    if segs.is_empty() {
        return raw;
    }

    let min = limits.min_length;
    let max = limits.max_length;
    let last = segs.len() - 1;
    let ends = |i: usize| boundary(&segs[i].text);
    let span = |s: usize, e: usize| segs[e].end - segs[s].start;

    let mut si = locate_start(segs, raw_start);
    let mut ei = locate_end(segs, raw_end).max(si);

    // Too long: drop whichever edge segment lands closer to the raw target.
    while span(si, ei) > max + EPSILON && si < ei {
        let advance_cost = (segs[si + 1].start - raw_start).abs();
        let retreat_cost = (segs[ei - 1].end - raw_end).abs();
        if retreat_cost <= advance_cost {
            ei -= 1;
        } else {
            si += 1;
        }
    }

    // Pull in the rest of a sentence on either side.
    while si > 0 && !ends(si - 1) && span(si - 1, ei) <= max + EPSILON {
        si -= 1;
    }
    while ei < last && !ends(ei) && span(si, ei + 1) <= max + EPSILON {
        ei += 1;
    }

    if !ends(ei) {
        if let Some(k) = (si..ei)
            .rev()
            .find(|&k| ends(k) && span(si, k) >= min - EPSILON)
        {
            ei = k;
        }
    }

    while span(si, ei) < min - EPSILON && ei < last && span(si, ei + 1) <= max + EPSILON {
        ei += 1;
    }
    while span(si, ei) < min - EPSILON && si > 0 && span(si - 1, ei) <= max + EPSILON {
        si -= 1;
    }

    let aligned = HighlightRange::new(segs[si].start, segs[ei].end);
    let inside_duration = limits
        .duration
        .map_or(true, |d| aligned.start >= -EPSILON && aligned.end <= d + EPSILON);

    if aligned.is_valid() && limits.contains_length(aligned.length()) && inside_duration {
        aligned
    } else {
        debug!(
            "[ALIGN] Keeping raw range {:.2}-{:.2}; aligned {:.2}-{:.2} breaks limits",
            raw.start, raw.end, aligned.start, aligned.end
        );
        raw
    }
}

fn locate_start(segs: &[TranscriptSegment], t: f64) -> usize {
    segs.iter()
        .position(|s| s.start <= t && t < s.end)
        .or_else(|| segs.iter().rposition(|s| s.start <= t))
        .unwrap_or(0)
}

fn locate_end(segs: &[TranscriptSegment], t: f64) -> usize {
    segs.iter()
        .position(|s| s.start < t && t <= s.end)
        .or_else(|| segs.iter().position(|s| s.end >= t))
        .unwrap_or(segs.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, end, text)
    }

    fn limits(duration: f64, min: f64, max: f64) -> LengthLimits {
        LengthLimits::new(Some(duration), min, max)
    }

    #[test]
    fn test_sentence_predicate() {
        assert!(ends_sentence("Done."));
        assert!(ends_sentence("Really?  "));
        assert!(ends_sentence("Wow!"));
        assert!(ends_sentence("and then..."));
        assert!(!ends_sentence("and then"));
        assert!(!ends_sentence(""));
    }

    #[test]
    fn test_extends_start_back_to_sentence_start() {
        let segments = vec![
            seg(0.0, 4.0, "So the thing"),
            seg(4.0, 8.0, "about rust is"),
            seg(8.0, 12.0, "ownership."),
            seg(12.0, 16.0, "Next topic."),
        ];
        let range = align(5.0, 12.0, &segments, &limits(16.0, 7.0, 45.0));
        assert_eq!(range, HighlightRange::new(0.0, 12.0));
    }

    #[test]
    fn test_trims_overlong_range_by_cheapest_edge() {
        let segments: Vec<TranscriptSegment> = (0..10)
            .map(|i| seg(i as f64 * 10.0, (i + 1) as f64 * 10.0, "Sentence."))
            .collect();
        let range = align(5.0, 55.0, &segments, &limits(100.0, 7.0, 25.0));
        assert_eq!(range, HighlightRange::new(20.0, 40.0));
    }

    #[test]
    fn test_retreats_end_to_earlier_sentence_end() {
        let segments = vec![
            seg(0.0, 5.0, "First point."),
            seg(5.0, 10.0, "Second point."),
            seg(10.0, 15.0, "and then we"),
            seg(15.0, 20.0, "kept going"),
        ];
        let range = align(1.0, 14.0, &segments, &limits(20.0, 7.0, 45.0));
        assert_eq!(range, HighlightRange::new(0.0, 10.0));
    }

    #[test]
    fn test_extends_short_range_to_minimum() {
        let segments = vec![
            seg(0.0, 3.0, "Hi."),
            seg(3.0, 6.0, "Yes."),
            seg(6.0, 9.0, "Okay."),
            seg(9.0, 12.0, "Done."),
        ];
        let range = align(3.5, 5.0, &segments, &limits(12.0, 7.0, 45.0));
        assert_eq!(range, HighlightRange::new(3.0, 12.0));
    }

    #[test]
    fn test_returns_raw_when_alignment_cannot_fit() {
        let segments = vec![seg(0.0, 60.0, "One very long monologue.")];
        let range = align(10.0, 30.0, &segments, &limits(60.0, 7.0, 45.0));
        assert_eq!(range, HighlightRange::new(10.0, 30.0));
    }

    #[test]
    fn test_sorts_unordered_segments() {
        let segments = vec![
            seg(8.0, 16.0, "Second sentence."),
            seg(0.0, 8.0, "First sentence."),
        ];
        let range = align(2.0, 10.0, &segments, &limits(16.0, 7.0, 45.0));
        assert_eq!(range, HighlightRange::new(0.0, 16.0));
    }

    #[test]
    fn test_custom_boundary_predicate() {
        let segments = vec![
            seg(0.0, 5.0, "alpha;"),
            seg(5.0, 10.0, "beta"),
            seg(10.0, 15.0, "gamma;"),
        ];
        let semicolons: SentenceBoundary = |text| text.trim_end().ends_with(';');
        let range = align_with(5.0, 9.0, &segments, &limits(15.0, 3.0, 45.0), semicolons);
        assert_eq!(range, HighlightRange::new(5.0, 15.0));
    }

    #[test]
    fn test_aligned_boundaries_sit_on_segment_edges() {
        let segments: Vec<TranscriptSegment> = (0..30)
            .map(|i| {
                let text = if i % 3 == 2 { "end of thought." } else { "still talking" };
                seg(i as f64 * 4.0, i as f64 * 4.0 + 3.5, text)
            })
            .collect();
        let limits = limits(120.0, 7.0, 45.0);
        let starts: Vec<f64> = segments.iter().map(|s| s.start).collect();
        let ends: Vec<f64> = segments.iter().map(|s| s.end).collect();

        for raw_start in [0.0, 3.7, 17.2, 50.0, 90.1] {
            let raw_end = raw_start + 20.0;
            let range = align(raw_start, raw_end, &segments, &limits);
            if range != HighlightRange::new(raw_start, raw_end) {
                assert!(starts.contains(&range.start), "{:?}", range);
                assert!(ends.contains(&range.end), "{:?}", range);
            }
            assert!(limits.contains_length(range.length()));
        }
    }
}
