// SYNOID Content Builder
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::agent::transcription::{sorted_segments, TranscriptSegment};

/// Transcript text spoken inside `[start, end]`.
///
/// Uses word timings where present; otherwise slices the segment's words in
/// proportion to how much of it the range covers. Empty when nothing
/// intersects, which callers treat as a rejected candidate.
pub fn build_content(segments: &[TranscriptSegment], start: f64, end: f64) -> String {
    build_content_sorted(&sorted_segments(segments), start, end)
}

/// [`build_content`] over segments already ordered by [`sorted_segments`].
pub(crate) fn build_content_sorted(segs: &[TranscriptSegment], start: f64, end: f64) -> String {
    if !(start.is_finite() && end.is_finite()) || end <= start {
        return String::new();
    }

    let mut pieces: Vec<String> = Vec::new();
    for seg in segs {
        if seg.start >= end {
            break;
        }
        let from = seg.start.max(start);
        let to = seg.end.min(end);
        if to <= from {
            continue;
        }

        match seg.timed_words() {
            Some(words) => pieces.extend(
                words
                    .iter()
                    .filter(|w| w.end > start && w.start < end)
                    .map(|w| w.text.clone()),
            ),
            None => pieces.push(slice_by_coverage(seg, from, to)),
        }
    }

    pieces
        .iter()
        .flat_map(|p| p.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn slice_by_coverage(seg: &TranscriptSegment, from: f64, to: f64) -> String {
    let tokens: Vec<&str> = seg.text.split_whitespace().collect();
    if tokens.is_empty() {
        return String::new();
    }

    let n = tokens.len();
    let span = seg.duration();
    let head = (((from - seg.start) / span) * n as f64).floor() as usize;
    let tail = (((to - seg.start) / span) * n as f64).ceil() as usize;
    // At least one word once any overlap exists.
    let head = head.min(n - 1);
    let tail = tail.clamp(head + 1, n);
    tokens[head..tail].join(" ")
}

/// Caller-supplied title, else the opening words of the content.
pub fn derive_title(supplied: Option<&str>, content: &str, word_count: usize) -> Option<String> {
    if let Some(title) = supplied.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(title.to_string());
    }
    let words: Vec<&str> = content.split_whitespace().take(word_count).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::transcription::TranscriptWord;

    fn word(start: f64, end: f64, text: &str) -> TranscriptWord {
        TranscriptWord {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_word_timings_select_exact_words() {
        let segments = vec![TranscriptSegment::new(0.0, 4.0, "one two three four").with_words(vec![
            word(0.0, 1.0, "one"),
            word(1.0, 2.0, "two"),
            word(2.0, 3.0, "three"),
            word(3.0, 4.0, "four"),
        ])];
        assert_eq!(build_content(&segments, 1.2, 2.5), "two three");
    }

    #[test]
    fn test_proportional_slice_without_words() {
        let segments = vec![TranscriptSegment::new(
            0.0,
            10.0,
            "a b c d e f g h i j",
        )];
        assert_eq!(build_content(&segments, 0.0, 4.0), "a b c d");
        assert_eq!(build_content(&segments, 6.0, 10.0), "g h i j");
    }

    #[test]
    fn test_tiny_overlap_keeps_one_word() {
        let segments = vec![TranscriptSegment::new(0.0, 100.0, "alpha beta gamma")];
        assert_eq!(build_content(&segments, 99.9, 120.0), "gamma");
    }

    #[test]
    fn test_joins_segments_and_collapses_whitespace() {
        let segments = vec![
            TranscriptSegment::new(5.0, 10.0, "  second   part. "),
            TranscriptSegment::new(0.0, 5.0, "First\tpart,"),
        ];
        assert_eq!(build_content(&segments, 0.0, 10.0), "First part, second part.");
    }

    #[test]
    fn test_no_intersection_is_empty() {
        let segments = vec![TranscriptSegment::new(0.0, 5.0, "Hello world.")];
        assert_eq!(build_content(&segments, 5.0, 9.0), "");
        assert_eq!(build_content(&segments, 3.0, 3.0), "");
    }

    #[test]
    fn test_title_fallback() {
        let content = "one two three four five six seven eight nine ten";
        assert_eq!(
            derive_title(None, content, 8).as_deref(),
            Some("one two three four five six seven eight")
        );
        assert_eq!(derive_title(Some("  Big reveal "), content, 8).as_deref(), Some("Big reveal"));
        assert_eq!(derive_title(Some("   "), "short", 8).as_deref(), Some("short"));
        assert_eq!(derive_title(None, "", 8), None);
    }
}
