//! Error taxonomy for the evaluation pipeline.

/// Recoverable failure of a single evaluation round.
///
/// Round failures never propagate out of the batch orchestrator; they are
/// logged, the round is excluded from the batch, and the remaining rounds
/// continue untouched.
#[derive(Debug, thiserror::Error)]
pub enum RoundFailure {
    #[error("round {round} exceeded the {limit_secs}s deadline")]
    Timeout { round: usize, limit_secs: u64 },

    #[error("round {round} evaluator call failed: {message}")]
    Caller { round: usize, message: String },

    #[error("round {round} response contained no parseable score")]
    NoScore { round: usize },
}

impl RoundFailure {
    /// The 1-based round index this failure belongs to.
    pub fn round(&self) -> usize {
        match self {
            Self::Timeout { round, .. } | Self::Caller { round, .. } | Self::NoScore { round } => {
                *round
            }
        }
    }
}

/// Errors surfaced to callers of the batch evaluation operation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Every round failed or no round produced a parseable score. Distinct
    /// from a `FAILED` rating: the rating enum is only meaningful when at
    /// least one score existed.
    #[error("no scores could be extracted from {rounds_attempted} evaluation rounds")]
    NoScoresExtracted { rounds_attempted: usize },

    #[error("invalid round count: requested {requested} rounds")]
    InvalidRounds { requested: usize },

    #[error("unknown evaluator capability: {name}")]
    UnknownEvaluator { name: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dramaplan evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;
