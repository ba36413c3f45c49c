//! Report composition and artifacts.
//!
//! The rendered report text is the externally visible deliverable of the
//! whole pipeline; the JSON artifact carries the same data for machine
//! consumers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::domain::EvaluationBatch;
use crate::stats::{Rating, ScoreStatistics};

/// The outcome of one batch evaluation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationReport {
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub theme: String,
    pub rating: Rating,
    /// Number of valid (score-bearing) rounds obtained.
    pub round_count: usize,
    pub statistics: ScoreStatistics,
    /// Human-readable report, see [`render_report`].
    pub report_text: String,
}

impl EvaluationReport {
    /// Assemble the report for a rated batch.
    pub fn new(batch: &EvaluationBatch, statistics: ScoreStatistics, rating: Rating) -> Self {
        let report_text = render_report(batch, &statistics, rating);
        Self {
            batch_id: batch.batch_id,
            generated_at: Utc::now(),
            theme: batch.theme.clone(),
            rating,
            round_count: statistics.valid_scores.len(),
            statistics,
            report_text,
        }
    }
}

/// Render the human-readable evaluation report.
pub fn render_report(batch: &EvaluationBatch, stats: &ScoreStatistics, rating: Rating) -> String {
    let mut out = String::new();
    out.push_str("# 故事评估报告\n\n");
    out.push_str(&format!("- 评级：{}\n", rating.label()));
    out.push_str(&format!("- 有效评估轮数：{}\n", stats.valid_scores.len()));
    out.push_str(&format!("- 评估结果：{:.2}\n", stats.evaluation_result()));
    out.push_str(&format!("- 首轮评分：{:.1}\n", stats.first));

    let later: Vec<String> = stats.valid_scores[1..]
        .iter()
        .map(|s| format!("{s:.1}"))
        .collect();
    out.push_str(&format!("- 后续各轮评分：{}\n", later.join("、")));

    out.push_str(&format!("- 最高分：{:.1}\n", stats.max));
    out.push_str(&format!("- 最低分：{:.1}\n", stats.min));
    out.push_str(&format!("- 平均分：{:.2}\n\n", stats.average));

    out.push_str("## 评级规则\n");
    out.push_str("- S（强烈推荐）：任意一轮评分达到 8.5 分，或 8.0 分以上的轮数达到 8 轮\n");
    out.push_str("- A（推荐）：8.0 分以上的轮数达到 5 轮\n");
    out.push_str("- B（一般）：其余情况\n");
    out.push_str("- 运行失败：有效评分轮数与请求轮数不一致\n\n");

    out.push_str("## 各轮评估原文\n");
    for round in &batch.rounds {
        out.push_str(&format!("### 第{}轮\n", round.round_index));
        out.push_str(&round.raw_text);
        out.push_str("\n\n");
    }
    out
}

/// Write the evaluation report as pretty JSON.
pub fn write_report_json(path: &Path, report: &EvaluationReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize evaluation report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EvaluationRound;

    fn batch_of(scores: &[f64]) -> EvaluationBatch {
        let rounds = scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                EvaluationRound::new(i + 1, format!("总评分：{s}分。本轮点评。"), Some(*s))
            })
            .collect();
        EvaluationBatch::from_rounds("都市逆袭", scores.len(), rounds)
    }

    #[test]
    fn test_report_lists_scores_in_round_order() {
        let batch = batch_of(&[9.0, 8.6, 8.0, 7.5]);
        let stats = ScoreStatistics::from_scores(&batch.valid_scores()).unwrap();
        let rating = Rating::decide(&stats, batch.requested_rounds);

        let text = render_report(&batch, &stats, rating);
        assert!(text.contains("- 首轮评分：9.0\n"));
        assert!(text.contains("- 后续各轮评分：8.6、8.0、7.5\n"));
        assert!(text.contains("- 评级：S（强烈推荐）\n"));
    }

    #[test]
    fn test_report_embeds_policy_footer_and_appendix() {
        let batch = batch_of(&[7.0, 7.0, 7.0]);
        let stats = ScoreStatistics::from_scores(&batch.valid_scores()).unwrap();
        let text = render_report(&batch, &stats, Rating::B);

        assert!(text.contains("## 评级规则"));
        assert!(text.contains("### 第3轮"));
        assert!(text.contains("本轮点评"));
    }

    #[test]
    fn test_report_uses_trimmed_average_as_result_when_defined() {
        let batch = batch_of(&[9.0, 8.0, 7.0]);
        let stats = ScoreStatistics::from_scores(&batch.valid_scores()).unwrap();
        let text = render_report(&batch, &stats, Rating::Failed);
        // trimmed average over three scores: (24 - 9 - 7) / 1 = 8.00
        assert!(text.contains("- 评估结果：8.00\n"));
    }

    #[test]
    fn test_report_json_artifact_schema() {
        let batch = batch_of(&[8.0, 8.0, 8.0]);
        let stats = ScoreStatistics::from_scores(&batch.valid_scores()).unwrap();
        let report = EvaluationReport::new(&batch, stats, Rating::B);

        let raw = serde_json::to_value(&report).expect("serialize report");
        let obj = raw.as_object().expect("report object");
        assert!(obj.contains_key("batch_id"));
        assert!(obj.contains_key("generated_at"));
        assert!(obj.contains_key("rating"));
        assert!(obj.contains_key("round_count"));
        assert!(obj.contains_key("statistics"));
        assert!(obj.contains_key("report_text"));
        assert_eq!(raw["rating"], serde_json::json!("B"));
        assert_eq!(raw["round_count"], serde_json::json!(3));
    }

    #[test]
    fn test_write_report_json_roundtrip() {
        let batch = batch_of(&[8.0, 8.0, 8.0]);
        let stats = ScoreStatistics::from_scores(&batch.valid_scores()).unwrap();
        let report = EvaluationReport::new(&batch, stats, Rating::B);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&path, &report).unwrap();

        let loaded: EvaluationReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
    }
}
