// SYNOID Highlight Errors
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use thiserror::Error;

/// Failures surfaced to callers of the highlight selector.
///
/// Everything else (bad JSON, short or overlapping candidate lists) is
/// absorbed by the fallback ladder and never reaches this type.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Missing API credential for the completion provider (set {0})")]
    MissingCredential(&'static str),

    /// Non-2xx response; the message is the provider's raw body.
    #[error("{body}")]
    Transport { status: u16, body: String },

    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("No highlights could be generated from this transcript")]
    NoHighlights,
}

impl HighlightError {
    pub fn from_status(status: u16, body: &str) -> Self {
        HighlightError::Transport {
            status,
            body: body.to_string(),
        }
    }
}
