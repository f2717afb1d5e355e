use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use super::defaults::default_tips;
use super::extract::{complete_tips, extract_json, parse_json, validate, ParseFailure, Spans};
use super::prediction::{HealthPrediction, Verdict};

lazy_static! {
    static ref RISK_KEYWORDS_RE: Regex =
        Regex::new(r"risky|not recommended|avoid|high sodium|high sugar|high carbohydrate").unwrap();
}

/// Interprets the text returned for an assessment prompt.
///
/// Never fails: when no valid prediction can be recovered, the verdict is
/// guessed from risk keywords in the raw text and the text itself becomes
/// the reasoning.
pub fn parse_llm_response(output: &str) -> HealthPrediction {
    match interpret(output) {
        Ok(prediction) => prediction,
        Err(failure) => {
            warn!(error = %failure, degraded = true, "model output parsing failed; using keyword heuristic");
            keyword_verdict(output)
        }
    }
}

fn interpret(output: &str) -> Result<HealthPrediction, ParseFailure> {
    let payload = extract_json(output, Spans::ObjectsAndArrays)?;
    let mut value = parse_json(payload)?;
    complete_tips(&mut value);
    validate(value)
}

pub(crate) fn keyword_verdict(output: &str) -> HealthPrediction {
    let risky = RISK_KEYWORDS_RE.is_match(&output.to_lowercase());
    HealthPrediction {
        verdict: if risky { Verdict::Risky } else { Verdict::Safe },
        reasoning: output.trim().to_owned(),
        tips: default_tips(risky).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::prediction::Tip;

    #[test]
    fn clean_json_is_returned_unchanged() {
        let raw = r#"{"prediction":"Safe","reasoning":"ok","healthTip":[{"content":"a"},{"content":"b"},{"content":"c"},{"content":"d"},{"content":"e"}]}"#;
        let prediction = parse_llm_response(raw);
        assert_eq!(prediction.verdict, Verdict::Safe);
        assert_eq!(prediction.reasoning, "ok");
        assert_eq!(
            prediction.tips,
            ["a", "b", "c", "d", "e"].map(Tip::new).to_vec()
        );
        assert_eq!(
            serde_json::to_value(&prediction).unwrap(),
            serde_json::from_str::<serde_json::Value>(raw).unwrap()
        );
    }

    #[test]
    fn fenced_json_without_tips_gets_risky_defaults() {
        let raw = "Sure! ```json\n{\"prediction\":\"Risky\",\"reasoning\":\"too much sugar\"}\n```";
        let prediction = parse_llm_response(raw);
        assert_eq!(prediction.verdict, Verdict::Risky);
        assert_eq!(prediction.reasoning, "too much sugar");
        assert_eq!(prediction.tips, default_tips(true).to_vec());
    }

    #[test]
    fn prose_falls_back_to_keywords() {
        let raw = "  This food is risky due to high sodium.\n";
        let prediction = parse_llm_response(raw);
        assert_eq!(prediction.verdict, Verdict::Risky);
        assert_eq!(prediction.reasoning, "This food is risky due to high sodium.");
        assert_eq!(prediction.tips.len(), 5);
    }

    #[test]
    fn prose_without_keywords_is_safe() {
        let prediction = parse_llm_response("Looks like a balanced choice.");
        assert_eq!(prediction.verdict, Verdict::Safe);
        assert_eq!(prediction.tips, default_tips(false).to_vec());
    }

    #[test]
    fn smart_quotes_and_trailing_commas_are_repaired() {
        let raw = "{\u{201C}prediction\u{201D}: \u{201C}Safe\u{201D}, \u{201C}reasoning\u{201D}: \u{201C}fine\u{201D},}";
        let prediction = parse_llm_response(raw);
        assert_eq!(prediction.verdict, Verdict::Safe);
        assert_eq!(prediction.reasoning, "fine");
        assert_eq!(prediction.tips, default_tips(false).to_vec());
    }

    #[test]
    fn lowercase_verdict_degrades_to_keywords() {
        let raw = r#"{"prediction":"risky","reasoning":"Avoid this snack"}"#;
        let prediction = parse_llm_response(raw);
        assert_eq!(prediction.verdict, Verdict::Risky);
        assert_eq!(prediction.reasoning, raw);
    }

    #[test]
    fn bare_array_fails_validation() {
        let prediction = parse_llm_response("[1, 2, 3]");
        assert_eq!(prediction.verdict, Verdict::Safe);
        assert_eq!(prediction.reasoning, "[1, 2, 3]");
    }
}
