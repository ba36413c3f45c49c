//! Round and batch tracking.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed LLM evaluation call.
///
/// Rounds whose call errored or timed out never become `EvaluationRound`
/// values at all — the orchestrator drops them before batch construction.
/// `failed` is therefore only true for rounds that returned text in which
/// no score could be found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationRound {
    /// 1-based index of this round within the batch.
    pub round_index: usize,

    /// Full response text returned by the evaluator for this round.
    pub raw_text: String,

    /// Score parsed out of `raw_text`, when one was found.
    pub extracted_score: Option<f64>,

    /// True when `raw_text` contained no parseable score.
    pub failed: bool,
}

impl EvaluationRound {
    /// Build a round from raw response text and its (optional) parsed score.
    pub fn new(round_index: usize, raw_text: String, extracted_score: Option<f64>) -> Self {
        Self {
            round_index,
            raw_text,
            failed: extracted_score.is_none(),
            extracted_score,
        }
    }
}

/// The complete set of rounds belonging to one evaluation request.
///
/// # Invariants
///
/// `rounds.len() <= requested_rounds`, and `rounds` is sorted by
/// `round_index`. Rounds that failed outright (call error, timeout) are
/// excluded rather than inserted as placeholders — the rating policy depends
/// on the exact count of successful, score-bearing rounds matching the
/// requested total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationBatch {
    /// Unique identifier for this batch, used in tracing and artifacts.
    pub batch_id: Uuid,

    /// Context string passed uniformly to every round.
    pub theme: String,

    /// Number of rounds requested for this batch.
    pub requested_rounds: usize,

    /// Surviving rounds in `round_index` order.
    pub rounds: Vec<EvaluationRound>,
}

impl EvaluationBatch {
    /// Assemble a batch from surviving rounds, re-establishing round order.
    ///
    /// Completion order of concurrent calls is non-deterministic; `first`
    /// and the per-round score listing in the report are order-sensitive, so
    /// ordering is restored here, once, before any aggregation.
    pub fn from_rounds(
        theme: impl Into<String>,
        requested_rounds: usize,
        rounds: Vec<EvaluationRound>,
    ) -> Self {
        Self::assemble(Uuid::new_v4(), theme, requested_rounds, rounds)
    }

    /// Like [`from_rounds`](Self::from_rounds), but under a caller-supplied
    /// batch id. The orchestrator allocates the id before dispatch so the
    /// batch tracing span covers the fan-out as well.
    pub fn assemble(
        batch_id: Uuid,
        theme: impl Into<String>,
        requested_rounds: usize,
        mut rounds: Vec<EvaluationRound>,
    ) -> Self {
        rounds.sort_by_key(|r| r.round_index);
        Self {
            batch_id,
            theme: theme.into(),
            requested_rounds,
            rounds,
        }
    }

    /// Scores of all score-bearing rounds, in round order.
    pub fn valid_scores(&self) -> Vec<f64> {
        self.rounds
            .iter()
            .filter_map(|r| r.extracted_score)
            .collect()
    }

    /// Count of score-bearing rounds.
    pub fn valid_count(&self) -> usize {
        self.rounds
            .iter()
            .filter(|r| r.extracted_score.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_without_score_is_failed() {
        let round = EvaluationRound::new(1, "no score here".to_string(), None);
        assert!(round.failed);

        let round = EvaluationRound::new(1, "总评分：8.5".to_string(), Some(8.5));
        assert!(!round.failed);
    }

    #[test]
    fn test_batch_restores_round_order() {
        let rounds = vec![
            EvaluationRound::new(3, "c".to_string(), Some(7.0)),
            EvaluationRound::new(1, "a".to_string(), Some(9.0)),
            EvaluationRound::new(2, "b".to_string(), Some(8.0)),
        ];
        let batch = EvaluationBatch::from_rounds("都市", 3, rounds);

        let indices: Vec<usize> = batch.rounds.iter().map(|r| r.round_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(batch.valid_scores(), vec![9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_valid_scores_skip_unparsed_rounds() {
        let rounds = vec![
            EvaluationRound::new(1, "a".to_string(), Some(9.0)),
            EvaluationRound::new(2, "b".to_string(), None),
            EvaluationRound::new(3, "c".to_string(), Some(7.0)),
        ];
        let batch = EvaluationBatch::from_rounds("甜宠", 3, rounds);

        assert_eq!(batch.valid_scores(), vec![9.0, 7.0]);
        assert_eq!(batch.valid_count(), 2);
        assert_eq!(batch.rounds.len(), 3);
    }

    #[test]
    fn test_assemble_keeps_supplied_batch_id() {
        let id = Uuid::new_v4();
        let batch = EvaluationBatch::assemble(
            id,
            "都市",
            1,
            vec![EvaluationRound::new(1, "总评分：8.0".to_string(), Some(8.0))],
        );
        assert_eq!(batch.batch_id, id);
    }

    #[test]
    fn test_batch_serde_roundtrip() {
        let batch = EvaluationBatch::from_rounds(
            "悬疑",
            2,
            vec![EvaluationRound::new(1, "总评分：8.0".to_string(), Some(8.0))],
        );
        let json = serde_json::to_string(&batch).expect("serialize");
        let deserialized: EvaluationBatch = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(batch, deserialized);
    }
}
