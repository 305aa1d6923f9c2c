// SYNOID Highlight Engine
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Turns a long transcript into short, sentence-bounded highlight clips.
// An LLM proposes candidates; a ladder of deterministic fallbacks tops up
// whatever it fails to deliver.

pub mod aligner;
pub mod content;
pub mod editable;
pub mod fallback;
pub mod limits;
pub mod overlap;
pub mod prompt;
pub mod selector;
pub mod strategy;

use serde::{Deserialize, Serialize};

pub use aligner::{align, SentenceBoundary};
pub use content::{build_content, derive_title};
pub use editable::update_with_range;
pub use fallback::{FallbackContext, FallbackLadder, FallbackTier};
pub use limits::{normalize, LengthLimits};
pub use overlap::{filter_distinct, is_significant_overlap, OverlapPolicy};
pub use selector::{HighlightSelector, SelectionOptions};
pub use strategy::HighlightStrategy;

/// Floating tolerance for length-bound checks.
pub(crate) const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightRange {
    pub start: f64,
    pub end: f64,
}

impl HighlightRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }

    /// Rounded (start, end) used to spot exact duplicates.
    pub fn key(&self, precision: u32) -> (i64, i64) {
        let scale = 10f64.powi(precision as i32);
        (
            (self.start * scale).round() as i64,
            (self.end * scale).round() as i64,
        )
    }
}

/// A finalized clip with the transcript text it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: f64,
    pub end: f64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Highlight {
    pub fn range(&self) -> HighlightRange {
        HighlightRange::new(self.start, self.end)
    }
}

/// Anything occupying a span of the timeline.
pub trait TimeSpan {
    fn span(&self) -> HighlightRange;
}

impl TimeSpan for HighlightRange {
    fn span(&self) -> HighlightRange {
        *self
    }
}

impl TimeSpan for Highlight {
    fn span(&self) -> HighlightRange {
        self.range()
    }
}
