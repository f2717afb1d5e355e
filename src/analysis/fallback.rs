use super::prediction::{HealthPrediction, Tip, Verdict};
use crate::nutrition::{AnalyzeFoodRequest, Condition};

/// 20% of the daily value, per serving.
const SODIUM_DV_20_MG: f64 = 460.0;
/// Daily hypertension limit split across three meals.
const HYPERTENSION_SODIUM_PER_MEAL_MG: f64 = 1500.0 / 3.0;
const MEAL_CARBS_MAX_G: f64 = 60.0;
const SNACK_CARBS_MAX_G: f64 = 30.0;
const ADDED_SUGARS_MAX_G: f64 = 10.0;
const SATURATED_FAT_MAX_PCT: f64 = 10.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Rule-based assessment used when the inference service is unreachable.
///
/// Rules are independent; every rule that fires adds its reason in order, so
/// the general and the hypertension sodium rules can both appear.
pub fn fallback_analysis(request: &AnalyzeFoodRequest) -> HealthPrediction {
    let n = &request.nutrition;
    let condition = request.condition;
    let mut reasons: Vec<String> = Vec::new();
    let mut risky = false;

    if n.sodium >= SODIUM_DV_20_MG {
        risky = true;
        reasons.push(format!(
            "High sodium content ({}mg) exceeds 20% DV per serving",
            n.sodium
        ));
    }

    if condition.is_some_and(Condition::includes_diabetes) {
        if n.carbohydrates > MEAL_CARBS_MAX_G {
            risky = true;
            reasons.push(format!(
                "Carbohydrate content ({}g) exceeds recommended meal range of 30-60g",
                n.carbohydrates
            ));
        } else if n.carbohydrates > SNACK_CARBS_MAX_G
            && n.serving_size.to_lowercase().contains("snack")
        {
            risky = true;
            reasons.push(format!(
                "Carbohydrate content ({}g) exceeds recommended snack range of 15-30g",
                n.carbohydrates
            ));
        }
    }

    if let Some(added) = stated(n.added_sugars).filter(|g| *g > ADDED_SUGARS_MAX_G) {
        risky = true;
        reasons.push(format!(
            "High added sugars ({added}g) exceeds 10g per serving threshold"
        ));
    }

    if let (Some(sat_fat), Some(calories)) = (stated(n.saturated_fat), stated(Some(n.calories))) {
        let pct = sat_fat * KCAL_PER_GRAM_FAT / calories * 100.0;
        if pct > SATURATED_FAT_MAX_PCT {
            risky = true;
            reasons.push(format!("Saturated fat ({sat_fat}g) exceeds 10% of calories"));
        }
    }

    if condition.is_some_and(Condition::includes_hypertension)
        && n.sodium > HYPERTENSION_SODIUM_PER_MEAL_MG
    {
        risky = true;
        reasons.push(format!(
            "Sodium content ({}mg) exceeds recommended per-meal limit for hypertension",
            n.sodium
        ));
    }

    if let Some(potassium) = stated(n.potassium) {
        reasons.push(format!(
            "Contains {potassium}mg potassium (beneficial for blood pressure control if no kidney issues)"
        ));
    }

    if risky {
        return HealthPrediction {
            verdict: Verdict::Risky,
            reasoning: reasons.join(". "),
            tips: risky_tips(condition),
        };
    }

    let summary = if reasons.is_empty() {
        "all nutrient levels acceptable".to_owned()
    } else {
        reasons.join(". ")
    };
    HealthPrediction {
        verdict: Verdict::Safe,
        reasoning: format!("Within recommended limits: {summary}"),
        tips: safe_tips(),
    }
}

/// A stated, non-zero amount.
fn stated(amount: Option<f64>) -> Option<f64> {
    amount.filter(|v| *v != 0.0 && !v.is_nan())
}

fn risky_tips(condition: Option<Condition>) -> Vec<Tip> {
    // Keyed on the condition label, so `both` gets the generic wording.
    let carb_tip = if condition.is_some_and(|c| c.as_str().contains("diabetes")) {
        "Monitor total carbohydrates carefully."
    } else {
        "Watch portion sizes."
    };
    [
        "Choose lower-sodium alternatives when available.",
        carb_tip,
        "Consider splitting portions for better nutrient management.",
        "Balance with fiber-rich vegetables when possible.",
        "Track daily totals of key nutrients (sodium, carbs, sugars).",
    ]
    .map(Tip::new)
    .to_vec()
}

fn safe_tips() -> Vec<Tip> {
    [
        "Continue monitoring portion sizes.",
        "Maintain balanced nutrient intake across meals.",
        "Include variety in your diet for complete nutrition.",
        "Stay hydrated throughout the day.",
        "Regular physical activity supports healthy metabolism.",
    ]
    .map(Tip::new)
    .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parser::parse_llm_response;
    use crate::nutrition::NutritionData;

    fn request(condition: Option<Condition>, nutrition: NutritionData) -> AnalyzeFoodRequest {
        AnalyzeFoodRequest {
            food_name: Some("Test food".into()),
            condition,
            nutrition,
        }
    }

    #[test]
    fn sodium_at_threshold_is_risky() {
        for sodium in [460.0, 461.5, 2000.0] {
            let prediction = fallback_analysis(&request(
                Some(Condition::Diabetes),
                NutritionData { sodium, ..Default::default() },
            ));
            assert_eq!(prediction.verdict, Verdict::Risky);
            assert!(prediction.reasoning.contains("sodium"));
            assert_eq!(prediction.tips.len(), 5);
        }
    }

    #[test]
    fn moderate_food_is_safe_for_diabetes() {
        let prediction = fallback_analysis(&request(
            Some(Condition::Diabetes),
            NutritionData {
                calories: 200.0,
                sodium: 459.0,
                carbohydrates: 60.0,
                added_sugars: Some(10.0),
                saturated_fat: Some(2.0),
                ..Default::default()
            },
        ));
        assert_eq!(prediction.verdict, Verdict::Safe);
        assert_eq!(
            prediction.reasoning,
            "Within recommended limits: all nutrient levels acceptable"
        );
        assert_eq!(prediction.tips[0].content, "Continue monitoring portion sizes.");
    }

    #[test]
    fn both_sodium_rules_fire_for_hypertension() {
        let prediction = fallback_analysis(&request(
            Some(Condition::Hypertension),
            NutritionData { sodium: 520.0, ..Default::default() },
        ));
        assert_eq!(prediction.verdict, Verdict::Risky);
        assert_eq!(
            prediction.reasoning,
            "High sodium content (520mg) exceeds 20% DV per serving. \
             Sodium content (520mg) exceeds recommended per-meal limit for hypertension"
        );
        assert_eq!(prediction.tips[1].content, "Watch portion sizes.");
    }

    #[test]
    fn snack_carbs_only_count_for_snacks() {
        let snack = NutritionData {
            carbohydrates: 35.0,
            serving_size: "1 Snack Pack".into(),
            ..Default::default()
        };
        let prediction = fallback_analysis(&request(Some(Condition::Diabetes), snack.clone()));
        assert_eq!(prediction.verdict, Verdict::Risky);
        assert!(prediction.reasoning.contains("snack range of 15-30g"));
        assert_eq!(prediction.tips[1].content, "Monitor total carbohydrates carefully.");

        let meal = NutritionData { serving_size: "1 plate".into(), ..snack.clone() };
        assert_eq!(
            fallback_analysis(&request(Some(Condition::Diabetes), meal)).verdict,
            Verdict::Safe
        );
        assert_eq!(
            fallback_analysis(&request(Some(Condition::Hypertension), snack)).verdict,
            Verdict::Safe
        );
    }

    #[test]
    fn both_condition_uses_generic_carb_tip() {
        let prediction = fallback_analysis(&request(
            Some(Condition::Both),
            NutritionData { carbohydrates: 75.0, ..Default::default() },
        ));
        assert_eq!(prediction.verdict, Verdict::Risky);
        assert!(prediction.reasoning.contains("meal range of 30-60g"));
        assert_eq!(prediction.tips[1].content, "Watch portion sizes.");
    }

    #[test]
    fn saturated_fat_share_of_calories() {
        let prediction = fallback_analysis(&request(
            None,
            NutritionData {
                calories: 100.0,
                saturated_fat: Some(1.5),
                ..Default::default()
            },
        ));
        assert_eq!(prediction.verdict, Verdict::Risky);
        assert_eq!(prediction.reasoning, "Saturated fat (1.5g) exceeds 10% of calories");

        let unknown_calories = fallback_analysis(&request(
            None,
            NutritionData { saturated_fat: Some(5.0), ..Default::default() },
        ));
        assert_eq!(unknown_calories.verdict, Verdict::Safe);
    }

    #[test]
    fn potassium_note_is_informational() {
        let prediction = fallback_analysis(&request(
            Some(Condition::Hypertension),
            NutritionData { potassium: Some(350.0), ..Default::default() },
        ));
        assert_eq!(prediction.verdict, Verdict::Safe);
        assert_eq!(
            prediction.reasoning,
            "Within recommended limits: Contains 350mg potassium \
             (beneficial for blood pressure control if no kidney issues)"
        );

        let risky = fallback_analysis(&request(
            None,
            NutritionData {
                added_sugars: Some(12.0),
                potassium: Some(350.0),
                ..Default::default()
            },
        ));
        assert_eq!(risky.verdict, Verdict::Risky);
        assert!(risky.reasoning.ends_with("if no kidney issues)"));
    }

    #[test]
    fn fallback_output_survives_reparsing() {
        let samples = [
            NutritionData { sodium: 800.0, potassium: Some(200.0), ..Default::default() },
            NutritionData { calories: 150.0, ..Default::default() },
        ];
        for nutrition in samples {
            let original = fallback_analysis(&request(Some(Condition::Both), nutrition));
            let json = serde_json::to_string(&original).unwrap();
            let reparsed = parse_llm_response(&json);
            assert_eq!(reparsed.verdict, original.verdict);
            assert_eq!(reparsed.reasoning, original.reasoning);
            assert_eq!(reparsed.tips, original.tips);
        }
    }
}
