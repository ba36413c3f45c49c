//! Score extraction from free-form evaluation text.
//!
//! Evaluation responses are prose; the numeric score is located through an
//! ordered pattern table of the form `<label><non-digit gap><number>`. The
//! primary label is tried first and the fallback label only when the
//! primary is absent. Extraction is a pure function of the text.

use regex::Regex;
use tracing::debug;

/// Score label patterns in priority order. Each matches the label followed
/// by an arbitrary run of non-digit characters, then a decimal number.
const SCORE_PATTERNS: [&str; 2] = [
    r"总评分[^0-9]*([0-9]+(?:\.[0-9]+)?)",
    r"总体评价[^0-9]*([0-9]+(?:\.[0-9]+)?)",
];

/// Extract a numeric score from one round's raw response text.
///
/// Returns `None` when no pattern matches — the round is then counted as
/// failed and contributes nothing to the statistics. Scores are parsed as
/// base-10 floats with no rounding.
pub fn extract_score(text: &str) -> Option<f64> {
    for pattern in SCORE_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(text) {
                if let Some(score) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
                    return Some(score);
                }
            }
        }
    }
    debug!("no score pattern matched in evaluation text");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label_with_colon() {
        assert_eq!(extract_score("总评分：8.7分，其他内容"), Some(8.7));
    }

    #[test]
    fn test_primary_label_with_gap_text() {
        assert_eq!(extract_score("综合来看，总评分为 9 分"), Some(9.0));
    }

    #[test]
    fn test_fallback_label_used_when_primary_absent() {
        assert_eq!(extract_score("总体评价：7.5，节奏偏慢"), Some(7.5));
    }

    #[test]
    fn test_primary_takes_priority_over_fallback() {
        let text = "总体评价：6.0。总评分：8.2";
        assert_eq!(extract_score(text), Some(8.2));
    }

    #[test]
    fn test_no_label_yields_none() {
        assert_eq!(extract_score("这个故事节奏很好，冲突强烈。"), None);
        assert_eq!(extract_score(""), None);
    }

    #[test]
    fn test_integer_score_parses_as_float() {
        assert_eq!(extract_score("总评分：8"), Some(8.0));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "总评分：8.7分";
        assert_eq!(extract_score(text), extract_score(text));
    }
}
