// SYNOID Transcript Model
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Time-stamped transcript types produced by the speech-to-text step and
// consumed read-only by the highlight engine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptWord {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Word-level timings, when the transcriber produced them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<TranscriptWord>>,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: &str) -> Self {
        Self {
            start,
            end,
            text: text.to_string(),
            words: None,
        }
    }

    pub fn with_words(mut self, words: Vec<TranscriptWord>) -> Self {
        self.words = Some(words);
        self
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }

    /// Timed words, or `None` when only segment-level timing exists.
    pub fn timed_words(&self) -> Option<&[TranscriptWord]> {
        match &self.words {
            Some(words) if !words.is_empty() => Some(words.as_slice()),
            _ => None,
        }
    }

    pub fn word_count(&self) -> usize {
        match self.timed_words() {
            Some(words) => words.len(),
            None => self.text.split_whitespace().count(),
        }
    }
}

/// Transcript handed over by the transcription collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptBundle {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl TranscriptBundle {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript {:?}", path))?;
        let bundle: TranscriptBundle = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse transcript JSON {:?}", path))?;

        info!(
            "[TRANSCRIPT] Loaded {} segments (language: {})",
            bundle.segments.len(),
            bundle.language.as_deref().unwrap_or("unknown")
        );
        Ok(bundle)
    }

    pub fn duration(&self) -> Option<f64> {
        transcript_duration(&self.segments)
    }
}

/// Duration implied by the transcript: the latest segment end.
pub fn transcript_duration(segments: &[TranscriptSegment]) -> Option<f64> {
    segments
        .iter()
        .map(|seg| seg.end)
        .filter(|end| end.is_finite() && *end > 0.0)
        .reduce(f64::max)
}

/// Segments ordered by (start, end), dropping entries with broken timing.
pub fn sorted_segments(segments: &[TranscriptSegment]) -> Vec<TranscriptSegment> {
    let mut sorted: Vec<TranscriptSegment> =
        segments.iter().filter(|s| s.is_valid()).cloned().collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));
    sorted
}
