//! Score aggregation and attention-level rating.
//!
//! Statistics are computed fresh per batch and never mutated afterwards.
//! The rating policy is a fixed, ordered rule list over the score
//! distribution; it is deliberately strict about the valid-score count
//! matching the requested round count exactly.

use serde::{Deserialize, Serialize};

/// Scores at or above this count as "high".
pub const HIGH_SCORE: f64 = 8.0;

/// Scores at or above this count as "very high".
pub const VERY_HIGH_SCORE: f64 = 8.5;

/// Summary statistics over one batch's valid scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreStatistics {
    /// Parsed scores in round order.
    pub valid_scores: Vec<f64>,
    pub min: f64,
    pub max: f64,
    /// Score of the earliest surviving round in round order. When round 1
    /// itself failed this is the next surviving round's score, not a true
    /// first-attempt value.
    pub first: f64,
    pub average: f64,
    /// Mean excluding one occurrence each of the minimum and maximum,
    /// defined only when more than two scores exist; otherwise the
    /// degenerate fallback `min(average, 0)`.
    pub trimmed_average: f64,
    /// Count of scores >= 8.0.
    pub high_count: usize,
    /// Count of scores >= 8.5.
    pub very_high_count: usize,
}

impl ScoreStatistics {
    /// Compute statistics over `valid_scores` (round order).
    ///
    /// Returns `None` for an empty slice — zero valid scores is a
    /// batch-level error upstream, never an all-zero statistics value.
    pub fn from_scores(valid_scores: &[f64]) -> Option<Self> {
        if valid_scores.is_empty() {
            return None;
        }

        let count = valid_scores.len();
        let min = valid_scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid_scores
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = valid_scores.iter().sum();
        let average = sum / count as f64;

        let trimmed_average = if count > 2 {
            (sum - min - max) / (count - 2) as f64
        } else {
            average.min(0.0)
        };

        Some(Self {
            valid_scores: valid_scores.to_vec(),
            min,
            max,
            first: valid_scores[0],
            average,
            trimmed_average,
            high_count: valid_scores.iter().filter(|&&s| s >= HIGH_SCORE).count(),
            very_high_count: valid_scores
                .iter()
                .filter(|&&s| s >= VERY_HIGH_SCORE)
                .count(),
        })
    }

    /// The headline value shown as "evaluation result" in the report:
    /// trimmed average when it is defined, plain average otherwise.
    pub fn evaluation_result(&self) -> f64 {
        if self.valid_scores.len() > 2 {
            self.trimmed_average
        } else {
            self.average
        }
    }
}

/// Attention-level rating for a batch. Closed, ordered categorical value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rating {
    /// Strongly recommend.
    S,
    /// Recommend.
    A,
    /// Ordinary.
    B,
    /// Run failed: valid-score count did not match the requested rounds.
    Failed,
}

impl Rating {
    /// Apply the rating policy, top to bottom, first match wins.
    ///
    /// The count check is strict equality: a batch with *more* valid scores
    /// than requested also rates `Failed`. That mirrors the established
    /// policy even though the orchestrator can never produce such a batch.
    pub fn decide(stats: &ScoreStatistics, requested_rounds: usize) -> Self {
        if stats.valid_scores.len() != requested_rounds {
            Rating::Failed
        } else if stats.very_high_count > 0 {
            Rating::S
        } else if stats.high_count >= 8 {
            Rating::S
        } else if stats.high_count >= 5 {
            Rating::A
        } else {
            Rating::B
        }
    }

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Rating::S => "S（强烈推荐）",
            Rating::A => "A（推荐）",
            Rating::B => "B（一般）",
            Rating::Failed => "运行失败",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Rating::S => "S",
            Rating::A => "A",
            Rating::B => "B",
            Rating::Failed => "FAILED",
        };
        write!(f, "{tag}")
    }
}
