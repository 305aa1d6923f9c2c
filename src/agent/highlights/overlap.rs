// SYNOID Overlap Filter
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::strategy::HighlightStrategy;
use super::{HighlightRange, TimeSpan};

/// When two ranges count as "the same clip".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapPolicy {
    /// Absolute overlap, in seconds, that is always significant.
    pub min_seconds: f64,
    /// Overlap as a share of the shorter range.
    pub min_ratio: f64,
}

impl Default for OverlapPolicy {
    fn default() -> Self {
        Self {
            min_seconds: 2.0,
            min_ratio: 0.6,
        }
    }
}

impl OverlapPolicy {
    pub fn from_strategy(strategy: &HighlightStrategy) -> Self {
        Self {
            min_seconds: strategy.overlap_seconds,
            min_ratio: strategy.overlap_ratio,
        }
    }

    pub fn is_significant(&self, a: &HighlightRange, b: &HighlightRange) -> bool {
        let overlap = overlap_seconds(a, b);
        if overlap <= 0.0 {
            return false;
        }
        if overlap >= self.min_seconds {
            return true;
        }
        let shorter = a.length().min(b.length());
        shorter > 0.0 && overlap / shorter >= self.min_ratio
    }

    /// Keep candidates, in input order, that clash with neither an excluded
    /// range nor a candidate kept before them.
    pub fn filter_distinct<T: TimeSpan>(
        &self,
        candidates: Vec<T>,
        exclude: &[HighlightRange],
    ) -> Vec<T> {
        let mut taken: Vec<HighlightRange> = exclude.to_vec();
        let mut kept = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let span = candidate.span();
            if taken.iter().any(|t| self.is_significant(&span, t)) {
                continue;
            }
            taken.push(span);
            kept.push(candidate);
        }
        kept
    }
}

/// Seconds shared by both ranges; zero or negative when disjoint.
pub fn overlap_seconds(a: &HighlightRange, b: &HighlightRange) -> f64 {
    a.end.min(b.end) - a.start.max(b.start)
}

pub fn is_significant_overlap(a: &HighlightRange, b: &HighlightRange) -> bool {
    OverlapPolicy::default().is_significant(a, b)
}

pub fn filter_distinct<T: TimeSpan>(candidates: Vec<T>, exclude: &[HighlightRange]) -> Vec<T> {
    OverlapPolicy::default().filter_distinct(candidates, exclude)
}
