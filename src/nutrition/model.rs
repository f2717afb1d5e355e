use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{
    lenient_count, lenient_f64, lenient_opt_f64, lenient_text, number_at, number_or_zero, text_at,
    to_count,
};

/// Label facts for one serving.
///
/// `added_sugars`, `saturated_fat`, `trans_fat`, `potassium` and `cholesterol`
/// stay `None` when the label does not state them: "not measured" and
/// "measured as zero" are different things downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionData {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbohydrates: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sodium: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fiber: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_sugars: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub added_sugars: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub trans_fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub serving_size: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub servings_per_container: u32,
}

impl NutritionData {
    /// Reads label facts out of loosely shaped model JSON.
    pub fn from_value(facts: &Value) -> Self {
        Self {
            calories: number_or_zero(facts, &["calories", "energy"]),
            carbohydrates: number_or_zero(facts, &["carbohydrates", "totalCarbohydrates", "total_carbohydrates", "carbs"]),
            protein: number_or_zero(facts, &["protein"]),
            fat: number_or_zero(facts, &["fat", "totalFat", "total_fat"]),
            sodium: number_or_zero(facts, &["sodium"]),
            fiber: number_or_zero(facts, &["fiber", "dietaryFiber", "dietary_fiber"]),
            total_sugars: number_or_zero(facts, &["totalSugars", "total_sugars", "sugars"]),
            added_sugars: number_at(facts, &["addedSugars", "added_sugars"]),
            saturated_fat: number_at(facts, &["saturatedFat", "saturated_fat"]),
            trans_fat: number_at(facts, &["transFat", "trans_fat"]),
            potassium: number_at(facts, &["potassium"]),
            cholesterol: number_at(facts, &["cholesterol"]),
            serving_size: text_at(facts, &["servingSize", "serving_size"]).unwrap_or_default(),
            servings_per_container: to_count(number_or_zero(
                facts,
                &["servingsPerContainer", "servings_per_container"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Diabetes,
    Hypertension,
    Both,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Diabetes => "diabetes",
            Condition::Hypertension => "hypertension",
            Condition::Both => "both",
        }
    }

    pub fn includes_diabetes(self) -> bool {
        matches!(self, Condition::Diabetes | Condition::Both)
    }

    pub fn includes_hypertension(self) -> bool {
        matches!(self, Condition::Hypertension | Condition::Both)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diabetes" => Ok(Condition::Diabetes),
            "hypertension" => Ok(Condition::Hypertension),
            "both" => Ok(Condition::Both),
            other => anyhow::bail!("unknown condition {other:?}"),
        }
    }
}

/// A nutrition snapshot submitted for assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFoodRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(flatten)]
    pub nutrition: NutritionData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub height_cm: f64,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub biological_sex: Option<String>,
    #[serde(default)]
    pub activity_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiabetesStatus {
    #[serde(default)]
    pub blood_sugar: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    #[serde(default)]
    pub systolic: Option<f64>,
    #[serde(default)]
    pub diastolic: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypertensionStatus {
    #[serde(default)]
    pub blood_pressure: Option<BloodPressure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherConditions {
    #[serde(default)]
    pub kidney_disease: bool,
    #[serde(default)]
    pub heart_disease: bool,
}

/// Health profile the assessment is personalised against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    pub primary_condition: Condition,
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub diabetes_status: Option<DiabetesStatus>,
    #[serde(default)]
    pub hypertension_status: Option<HypertensionStatus>,
    #[serde(default)]
    pub other_conditions: OtherConditions,
}

impl UserProfile {
    pub fn blood_sugar(&self) -> Option<f64> {
        self.diabetes_status.as_ref().and_then(|s| s.blood_sugar)
    }

    pub fn blood_pressure(&self) -> (Option<f64>, Option<f64>) {
        self.hypertension_status
            .as_ref()
            .and_then(|s| s.blood_pressure.as_ref())
            .map_or((None, None), |bp| (bp.systolic, bp.diastolic))
    }

    /// Profile parts an assessment prompt would render as "unknown".
    pub fn missing_parts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.as_deref().map_or(true, str::is_empty) {
            missing.push("name");
        }
        if self.demographics.age.is_none() {
            missing.push("demographics.age");
        }
        if self.primary_condition == Condition::Diabetes && self.diabetes_status.is_none() {
            missing.push("diabetesStatus");
        }
        if self.primary_condition == Condition::Hypertension && self.hypertension_status.is_none() {
            missing.push("hypertensionStatus");
        }
        missing
    }

    /// Whether the profile carries what an assessment needs: age, positive
    /// anthropometrics and the status block of the primary condition.
    pub fn is_complete(&self) -> bool {
        let d = &self.demographics;
        let anthropometrics = d.age.is_some() && d.height_cm > 0.0 && d.weight_kg > 0.0;
        let status = match self.primary_condition {
            Condition::Diabetes => self.diabetes_status.is_some(),
            Condition::Hypertension => self.hypertension_status.is_some(),
            Condition::Both => self.diabetes_status.is_some() && self.hypertension_status.is_some(),
        };
        anthropometrics && status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nutrition_deserializes_leniently() {
        let data: NutritionData = serde_json::from_value(json!({
            "calories": "250 kcal",
            "sodium": 480,
            "carbohydrates": null,
            "addedSugars": "12g",
            "potassium": "n/a",
            "servingSize": "1 bar (snack)",
            "servingsPerContainer": "2.5"
        }))
        .unwrap();

        assert_eq!(data.calories, 250.0);
        assert_eq!(data.sodium, 480.0);
        assert_eq!(data.carbohydrates, 0.0);
        assert_eq!(data.protein, 0.0);
        assert_eq!(data.added_sugars, Some(12.0));
        assert_eq!(data.potassium, None);
        assert_eq!(data.cholesterol, None);
        assert_eq!(data.serving_size, "1 bar (snack)");
        assert_eq!(data.servings_per_container, 2);
    }

    #[test]
    fn from_value_keeps_optional_nutrients_unset() {
        let data = NutritionData::from_value(&json!({
            "calories": 120,
            "saturated_fat": "1.5",
            "cholesterol": 0
        }));
        assert_eq!(data.calories, 120.0);
        assert_eq!(data.saturated_fat, Some(1.5));
        assert_eq!(data.cholesterol, Some(0.0));
        assert_eq!(data.added_sugars, None);
        assert_eq!(data.trans_fat, None);
        assert_eq!(data.fiber, 0.0);
    }

    #[test]
    fn analyze_request_flattens_nutrition() {
        let req: AnalyzeFoodRequest = serde_json::from_value(json!({
            "foodName": "Crackers",
            "condition": "both",
            "sodium": 300,
            "carbohydrates": 22
        }))
        .unwrap();
        assert_eq!(req.food_name.as_deref(), Some("Crackers"));
        assert_eq!(req.condition, Some(Condition::Both));
        assert_eq!(req.nutrition.sodium, 300.0);
        assert_eq!(req.nutrition.carbohydrates, 22.0);
    }

    #[test]
    fn condition_round_trips_through_text() {
        for c in [Condition::Diabetes, Condition::Hypertension, Condition::Both] {
            assert_eq!(c.as_str().parse::<Condition>().unwrap(), c);
        }
        assert!("Diabetes".parse::<Condition>().is_err());
    }

    #[test]
    fn profile_completeness() {
        let mut profile: UserProfile = serde_json::from_value(json!({
            "name": "Ana",
            "primaryCondition": "diabetes",
            "demographics": { "age": 54, "heightCm": 165, "weightKg": 70 }
        }))
        .unwrap();
        assert!(!profile.is_complete());
        assert_eq!(profile.missing_parts(), vec!["diabetesStatus"]);

        profile.diabetes_status = Some(DiabetesStatus { blood_sugar: Some(130.0) });
        assert!(profile.is_complete());
        assert!(profile.missing_parts().is_empty());

        profile.demographics.height_cm = 0.0;
        assert!(!profile.is_complete());
    }
}
