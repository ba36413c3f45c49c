//! Bounded-parallel batch evaluation.
//!
//! Fans out `requested_rounds` evaluation calls over a semaphore-bounded
//! set of Tokio tasks, each under its own deadline, then fans back in and
//! hands the surviving rounds to the statistics and rating engine. A
//! failing round never aborts its siblings; failures are collected as
//! values, not propagated.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{instrument, warn, Instrument};
use uuid::Uuid;

use crate::domain::{EvalError, EvaluationBatch, EvaluationRound, RoundFailure};
use crate::evaluator::StoryEvaluator;
use crate::extract::extract_score;
use crate::obs::{batch_span, emit_batch_rated, emit_batch_started, emit_round_finished};
use crate::report::EvaluationReport;
use crate::stats::{Rating, ScoreStatistics};

/// Default number of evaluation rounds per batch.
pub const DEFAULT_ROUNDS: usize = 10;

/// Default cap on concurrently in-flight evaluation calls.
pub const DEFAULT_PARALLEL_LIMIT: usize = 10;

/// Default per-round deadline.
pub const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for one evaluation batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of evaluation rounds to run.
    pub requested_rounds: usize,
    /// Maximum number of concurrently in-flight evaluation calls.
    pub max_concurrent: usize,
    /// Deadline applied independently to each round's call.
    pub round_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            requested_rounds: DEFAULT_ROUNDS,
            max_concurrent: DEFAULT_PARALLEL_LIMIT,
            round_timeout: DEFAULT_ROUND_TIMEOUT,
        }
    }
}

/// Run a full batch evaluation and produce the rated report.
///
/// Every round is dispatched, tagged with its 1-based round number, and
/// awaited to completion regardless of sibling outcomes. Rounds whose call
/// errored or timed out are excluded from the batch; rounds that returned
/// text without a parseable score stay in the batch marked failed. Zero
/// valid scores across all rounds surfaces as
/// [`EvalError::NoScoresExtracted`] rather than an empty report.
#[instrument(skip(evaluator, story_text, config), fields(theme = %theme))]
pub async fn run_batch_evaluation(
    evaluator: Arc<dyn StoryEvaluator>,
    story_text: &str,
    theme: &str,
    config: BatchConfig,
) -> Result<EvaluationReport, EvalError> {
    if config.requested_rounds == 0 {
        return Err(EvalError::InvalidRounds { requested: 0 });
    }
    let max_concurrent = if config.max_concurrent == 0 {
        warn!(
            default = DEFAULT_PARALLEL_LIMIT,
            "invalid max_concurrent, substituting default"
        );
        DEFAULT_PARALLEL_LIMIT
    } else {
        config.max_concurrent
    };

    // Allocate the batch id up front so the span covers the fan-out and
    // every round event correlates with its batch.
    let batch_id = Uuid::new_v4();
    let span = batch_span(&batch_id.to_string());

    let rounds = dispatch_rounds(
        evaluator,
        story_text,
        theme,
        config.requested_rounds,
        max_concurrent,
        config.round_timeout,
    )
    .instrument(span.clone())
    .await;

    let _guard = span.enter();
    let batch = EvaluationBatch::assemble(batch_id, theme, config.requested_rounds, rounds);

    let scores = batch.valid_scores();
    let Some(statistics) = ScoreStatistics::from_scores(&scores) else {
        return Err(EvalError::NoScoresExtracted {
            rounds_attempted: config.requested_rounds,
        });
    };

    let rating = Rating::decide(&statistics, batch.requested_rounds);
    emit_batch_rated(
        &batch.batch_id.to_string(),
        &rating.to_string(),
        scores.len(),
    );

    Ok(EvaluationReport::new(&batch, statistics, rating))
}

/// Fan out the evaluation calls and collect surviving rounds.
///
/// Each task returns a `Result` value; failures are logged and dropped
/// here, never propagated. Returned rounds are in completion order — the
/// batch constructor restores round order.
async fn dispatch_rounds(
    evaluator: Arc<dyn StoryEvaluator>,
    story_text: &str,
    theme: &str,
    requested_rounds: usize,
    max_concurrent: usize,
    round_timeout: Duration,
) -> Vec<EvaluationRound> {
    emit_batch_started(theme, requested_rounds, max_concurrent);

    let sem = Arc::new(tokio::sync::Semaphore::new(max_concurrent));
    let mut tasks: Vec<JoinHandle<Result<(usize, String), RoundFailure>>> = Vec::new();

    for round in 1..=requested_rounds {
        let evaluator = Arc::clone(&evaluator);
        let sem = Arc::clone(&sem);
        let story_text = story_text.to_string();
        let theme = theme.to_string();

        let task = tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.ok();

            match tokio::time::timeout(
                round_timeout,
                evaluator.evaluate(&story_text, &theme, round),
            )
            .await
            {
                Err(_) => Err(RoundFailure::Timeout {
                    round,
                    limit_secs: round_timeout.as_secs(),
                }),
                Ok(Err(e)) => Err(RoundFailure::Caller {
                    round,
                    message: e.to_string(),
                }),
                Ok(Ok(raw_text)) => Ok((round, raw_text)),
            }
        });

        tasks.push(task);
    }

    let mut rounds = Vec::new();
    for task in tasks {
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "evaluation task panicked or was cancelled");
                continue;
            }
        };

        match outcome {
            Ok((round, raw_text)) => {
                let score = extract_score(&raw_text);
                if score.is_none() {
                    warn!(failure = %RoundFailure::NoScore { round }, "round kept without score");
                }
                emit_round_finished(round, score.is_some());
                rounds.push(EvaluationRound::new(round, raw_text, score));
            }
            Err(failure) => {
                warn!(round = failure.round(), failure = %failure, "round excluded from batch");
                emit_round_finished(failure.round(), false);
            }
        }
    }

    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::fakes::ScriptedEvaluator;

    #[tokio::test]
    async fn test_config_defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.requested_rounds, 10);
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.round_timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_zero_rounds_is_an_error() {
        let evaluator = Arc::new(ScriptedEvaluator::from_scores(&[8.0]));
        let config = BatchConfig {
            requested_rounds: 0,
            ..BatchConfig::default()
        };

        let err = run_batch_evaluation(evaluator, "正文", "都市", config)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidRounds { requested: 0 }));
    }

    #[tokio::test]
    async fn test_zero_concurrency_substitutes_default() {
        let evaluator = Arc::new(ScriptedEvaluator::from_scores(&[9.0, 9.0, 9.0]));
        let config = BatchConfig {
            requested_rounds: 3,
            max_concurrent: 0,
            ..BatchConfig::default()
        };

        let report = run_batch_evaluation(evaluator, "正文", "都市", config)
            .await
            .unwrap();
        assert_eq!(report.round_count, 3);
    }
}
