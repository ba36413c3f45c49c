//! Evaluator boundary and capability registry.
//!
//! The LLM provider behind an evaluation call is an external collaborator;
//! the core only sees [`StoryEvaluator`]. Implementations are selected
//! through an [`EvaluatorRegistry`] constructed once and owned explicitly —
//! a closed lookup table, not a mutable global, so an unknown capability
//! name is an ordinary error rather than a runtime import failure.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::domain::EvalError;

/// One evaluation call against the external text-completion service.
///
/// Calls may take several seconds and may fail transiently; the batch
/// orchestrator imposes the per-round deadline and treats any error as a
/// round failure. The round number feeds prompt variability only and
/// implies nothing about completion order.
#[async_trait]
pub trait StoryEvaluator: Send + Sync {
    async fn evaluate(&self, story_text: &str, theme: &str, round: usize) -> Result<String>;
}

/// Closed registry of evaluator capabilities.
///
/// Construct once per orchestrator instance, registering every capability
/// explicitly; lookup by name returns an error for anything unregistered.
#[derive(Default)]
pub struct EvaluatorRegistry {
    capabilities: HashMap<String, Arc<dyn StoryEvaluator>>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under `name`.
    pub fn with_capability(
        mut self,
        name: impl Into<String>,
        evaluator: Arc<dyn StoryEvaluator>,
    ) -> Self {
        self.capabilities.insert(name.into(), evaluator);
        self
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> std::result::Result<Arc<dyn StoryEvaluator>, EvalError> {
        self.capabilities
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownEvaluator {
                name: name.to_string(),
            })
    }

    /// Registered capability names, sorted.
    pub fn capability_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.capabilities.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Replays captured round responses from disk.
///
/// Each round is served from `round-<n>.txt` inside the replay directory,
/// which makes the whole pipeline runnable offline against recorded
/// provider output.
pub struct ReplayEvaluator {
    dir: PathBuf,
}

impl ReplayEvaluator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl StoryEvaluator for ReplayEvaluator {
    async fn evaluate(&self, _story_text: &str, _theme: &str, round: usize) -> Result<String> {
        let path = self.dir.join(format!("round-{round}.txt"));
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read replay response {:?}", path))
    }
}

/// Deterministic in-memory evaluators for tests and local development.
pub mod fakes {
    use std::time::Duration;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use super::StoryEvaluator;

    /// Serves a canned response per round, cycling when rounds outnumber
    /// the scripted responses.
    pub struct ScriptedEvaluator {
        responses: Vec<String>,
    }

    impl ScriptedEvaluator {
        pub fn new(responses: Vec<String>) -> Self {
            Self { responses }
        }

        /// Responses of the form `总评分：<score>分`, one per score.
        pub fn from_scores(scores: &[f64]) -> Self {
            Self::new(
                scores
                    .iter()
                    .map(|s| format!("剧情紧凑，反转密度高。总评分：{s}分"))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl StoryEvaluator for ScriptedEvaluator {
        async fn evaluate(&self, _story_text: &str, _theme: &str, round: usize) -> Result<String> {
            if self.responses.is_empty() {
                bail!("no scripted responses");
            }
            Ok(self.responses[(round - 1) % self.responses.len()].clone())
        }
    }

    /// Fails every call.
    pub struct FailingEvaluator;

    #[async_trait]
    impl StoryEvaluator for FailingEvaluator {
        async fn evaluate(&self, _story_text: &str, _theme: &str, round: usize) -> Result<String> {
            bail!("evaluator unavailable (round {round})")
        }
    }

    /// Sleeps past any deadline before answering; for timeout tests.
    pub struct SlowEvaluator {
        pub delay: Duration,
    }

    #[async_trait]
    impl StoryEvaluator for SlowEvaluator {
        async fn evaluate(&self, _story_text: &str, _theme: &str, _round: usize) -> Result<String> {
            tokio::time::sleep(self.delay).await;
            Ok("总评分：9.0分".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::ScriptedEvaluator;
    use super::*;
    use crate::domain::EvalError;

    #[tokio::test]
    async fn test_registry_lookup_known_capability() {
        let registry = EvaluatorRegistry::new().with_capability(
            "story_evaluation",
            Arc::new(ScriptedEvaluator::from_scores(&[8.0])),
        );

        let evaluator = registry.get("story_evaluation").unwrap();
        let text = evaluator.evaluate("正文", "都市", 1).await.unwrap();
        assert!(text.contains("总评分"));
    }

    #[test]
    fn test_registry_unknown_capability_is_error() {
        let registry = EvaluatorRegistry::new();
        let err = registry.get("novel_screening").err().unwrap();
        assert!(matches!(err, EvalError::UnknownEvaluator { .. }));
    }

    #[test]
    fn test_capability_names_sorted() {
        let registry = EvaluatorRegistry::new()
            .with_capability("b", Arc::new(ScriptedEvaluator::from_scores(&[1.0])))
            .with_capability("a", Arc::new(ScriptedEvaluator::from_scores(&[1.0])));
        assert_eq!(registry.capability_names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_scripted_evaluator_cycles_responses() {
        let evaluator = ScriptedEvaluator::new(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(evaluator.evaluate("", "", 1).await.unwrap(), "x");
        assert_eq!(evaluator.evaluate("", "", 2).await.unwrap(), "y");
        assert_eq!(evaluator.evaluate("", "", 3).await.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_replay_evaluator_reads_round_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("round-1.txt"), "总评分：8.1分").unwrap();

        let evaluator = ReplayEvaluator::new(dir.path());
        let text = evaluator.evaluate("正文", "都市", 1).await.unwrap();
        assert_eq!(text, "总评分：8.1分");

        assert!(evaluator.evaluate("正文", "都市", 2).await.is_err());
    }
}
