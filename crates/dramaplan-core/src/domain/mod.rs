//! Domain models for dramaplan story evaluation.
//!
//! Canonical definitions for the core entities:
//! - `EvaluationRound`: one LLM evaluation call and its parsed score
//! - `EvaluationBatch`: the full set of rounds for one evaluation request
//! - `EvalError` / `RoundFailure`: the error taxonomy for the pipeline

pub mod error;
pub mod round;

// Re-export main types and errors
pub use error::{EvalError, Result, RoundFailure};
pub use round::{EvaluationBatch, EvaluationRound};
