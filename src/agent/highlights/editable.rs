// SYNOID Editable Range
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::content::{build_content, derive_title};
use super::limits::{normalize, LengthLimits};
use super::strategy::HighlightStrategy;
use super::Highlight;
use crate::agent::transcription::TranscriptSegment;
use tracing::debug;

/// Rebuild a highlight after a manual boundary edit.
///
/// Uses the loose editing bounds and skips sentence alignment, so the range
/// the user dragged to is kept as closely as the bounds allow. Always
/// returns something usable; content may be empty for silent stretches.
pub fn update_with_range(
    segments: &[TranscriptSegment],
    start: f64,
    end: f64,
    title: Option<&str>,
    duration_override: Option<f64>,
    strategy: &HighlightStrategy,
) -> Highlight {
    let limits = LengthLimits::for_editing(segments, duration_override, strategy);
    let range = normalize(start, end, &limits);
    let content = build_content(segments, range.start, range.end);
    let title = derive_title(title, &content, strategy.title_word_count);

    debug!(
        "[HIGHLIGHT] Manual edit {:.2}-{:.2} -> {:.2}-{:.2}",
        start, end, range.start, range.end
    );

    Highlight {
        start: range.start,
        end: range.end,
        content,
        title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new(0.0, 10.0, "a b c d e f g h i j"),
            TranscriptSegment::new(10.0, 20.0, "k l m n o p q r s t"),
        ]
    }

    #[test]
    fn test_keeps_unaligned_boundaries() {
        let h = update_with_range(&segments(), 2.0, 13.0, None, None, &HighlightStrategy::default());
        assert_eq!((h.start, h.end), (2.0, 13.0));
        assert_eq!(h.content, "c d e f g h i j k l m");
        assert_eq!(h.title.as_deref(), Some("c d e f g h i j"));
    }

    #[test]
    fn test_short_edit_is_widened_to_one_second() {
        let h = update_with_range(&segments(), 5.0, 5.2, Some("Tiny"), None, &HighlightStrategy::default());
        assert_eq!((h.start, h.end), (5.0, 6.0));
        assert_eq!(h.title.as_deref(), Some("Tiny"));
    }

    #[test]
    fn test_reversed_and_out_of_range_edit() {
        let h = update_with_range(&segments(), 25.0, 15.0, None, None, &HighlightStrategy::default());
        assert_eq!((h.start, h.end), (15.0, 20.0));
    }

    #[test]
    fn test_override_extends_duration() {
        let h = update_with_range(&segments(), 18.0, 40.0, None, Some(60.0), &HighlightStrategy::default());
        assert_eq!((h.start, h.end), (18.0, 40.0));
        assert_eq!(h.content, "s t");
    }

    #[test]
    fn test_never_panics_on_garbage() {
        let strategy = HighlightStrategy::default();
        let h = update_with_range(&[], f64::NAN, f64::INFINITY, None, None, &strategy);
        assert!(h.end > h.start);
        assert!(h.content.is_empty());
        assert_eq!(h.title, None);
    }
}
