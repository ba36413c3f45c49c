//! Dramaplan Core Library
//!
//! Multi-round LLM story evaluation for short-drama script planning:
//! bounded-parallel batch orchestration, score extraction from free-form
//! evaluation text, robust statistics, and the S/A/B attention-level
//! rating policy.

pub mod batch;
pub mod domain;
pub mod evaluator;
pub mod extract;
pub mod obs;
pub mod report;
pub mod stats;
pub mod telemetry;
pub mod text_prep;

pub use batch::{
    run_batch_evaluation, BatchConfig, DEFAULT_PARALLEL_LIMIT, DEFAULT_ROUNDS,
    DEFAULT_ROUND_TIMEOUT,
};

pub use domain::{EvalError, EvaluationBatch, EvaluationRound, Result, RoundFailure};

pub use evaluator::{EvaluatorRegistry, ReplayEvaluator, StoryEvaluator};

pub use extract::extract_score;

pub use report::{render_report, write_report_json, EvaluationReport};

pub use stats::{Rating, ScoreStatistics, HIGH_SCORE, VERY_HIGH_SCORE};

pub use text_prep::{split, truncate, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_LENGTH};

pub use obs::{batch_span, emit_batch_rated, emit_batch_started, emit_round_finished};
pub use telemetry::init_tracing;

/// Dramaplan version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
