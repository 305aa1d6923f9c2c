// SYNOID Highlight Strategy
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

const STRATEGY_FILE: &str = "highlight_strategy.json";
const STRATEGY_ENV: &str = "SYNOID_HIGHLIGHT_STRATEGY";

/// Tunable constants for highlight selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStrategy {
    pub min_highlight_seconds: f64,
    pub max_highlight_seconds: f64,
    /// Shortest range a manual edit may produce.
    pub editable_min_seconds: f64,
    pub default_highlight_count: usize,
    /// Minimum count when the caller pins an exact maximum.
    pub minimum_highlight_floor: usize,
    // Overlap thresholds have no documented derivation; tune freely.
    pub overlap_seconds: f64,
    pub overlap_ratio: f64,
    pub fallback_target_seconds: f64,
    pub density_lead_in_seconds: f64,
    pub title_word_count: usize,
    pub tokens_per_highlight: u32,
    pub min_completion_tokens: u32,
    pub timeline_strict_gap_seconds: f64,
    pub timeline_relaxed_gap_seconds: f64,
    /// Share of the fallback clip length that caps both timeline gaps.
    pub timeline_gap_ratio: f64,
    /// Decimal places used when comparing ranges for exact duplicates.
    pub key_precision: u32,
}

impl Default for HighlightStrategy {
    fn default() -> Self {
        Self {
            min_highlight_seconds: 7.0,
            max_highlight_seconds: 45.0,
            editable_min_seconds: 1.0,
            default_highlight_count: 6,
            minimum_highlight_floor: 4,
            overlap_seconds: 2.0,
            overlap_ratio: 0.6,
            fallback_target_seconds: 12.0,
            density_lead_in_seconds: 1.5,
            title_word_count: 8,
            tokens_per_highlight: 120,
            min_completion_tokens: 300,
            timeline_strict_gap_seconds: 2.0,
            timeline_relaxed_gap_seconds: 0.5,
            timeline_gap_ratio: 0.6,
            key_precision: 2,
        }
    }
}

impl HighlightStrategy {
    pub fn load() -> Self {
        let path = std::env::var(STRATEGY_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(STRATEGY_FILE));

        if let Ok(content) = fs::read_to_string(&path) {
            match serde_json::from_str(&content) {
                Ok(config) => {
                    info!("[HIGHLIGHT] Loaded highlight strategy from {:?}", path);
                    return config;
                }
                Err(e) => warn!("[HIGHLIGHT] Ignoring malformed {:?}: {}", path, e),
            }
        }
        info!("[HIGHLIGHT] Using default highlight strategy");
        Self::default()
    }

    /// Completion token budget for a request of `count` highlights.
    pub fn completion_tokens(&self, count: usize) -> u32 {
        let per_count = self.tokens_per_highlight.saturating_mul(count as u32);
        per_count.max(self.min_completion_tokens)
    }
}
