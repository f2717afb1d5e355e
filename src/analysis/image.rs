use serde_json::Value;
use tracing::warn;

use super::defaults::default_tips;
use super::extract::{complete_tips, extract_json, parse_json, validate, ParseFailure, Spans};
use super::parser::keyword_verdict;
use super::prediction::{HealthPrediction, ImageAnalysis, Verdict};
use crate::nutrition::coerce::is_truthy;
use crate::nutrition::NutritionData;

pub const FOLLOW_UP_REASONING: &str =
    "Nutrition facts extracted from image; follow-up analysis required.";

/// Interprets the text returned by the label OCR service.
///
/// When the payload carries label facts but no verdict, a placeholder `Safe`
/// prediction is returned alongside the facts; callers run a second,
/// text-only assessment on them.
pub fn parse_image_llm_response(output: &str) -> ImageAnalysis {
    match interpret(output) {
        Ok(analysis) => analysis,
        Err(failure) => {
            warn!(error = %failure, degraded = true, "image model output parsing failed; using keyword heuristic");
            ImageAnalysis {
                prediction: keyword_verdict(output),
                nutrition_data: None,
            }
        }
    }
}

fn interpret(output: &str) -> Result<ImageAnalysis, ParseFailure> {
    let payload = extract_json(output, Spans::ObjectsOnly)?;
    let mut value = parse_json(payload)?;

    let has_prediction = value.get("prediction").is_some_and(Value::is_string)
        && value.get("reasoning").is_some_and(Value::is_string);

    let nutrition = {
        let facts = value
            .get("nutritionFacts")
            .filter(|facts| is_truthy(facts))
            .unwrap_or(&value);
        NutritionData::from_value(facts)
    };

    let prediction = if has_prediction {
        complete_tips(&mut value);
        validate(value)?
    } else {
        HealthPrediction {
            verdict: Verdict::Safe,
            reasoning: FOLLOW_UP_REASONING.to_owned(),
            tips: default_tips(false).to_vec(),
        }
    };

    Ok(ImageAnalysis {
        prediction,
        nutrition_data: Some(nutrition),
    })
}
