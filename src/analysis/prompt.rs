use std::fmt::Display;

use super::prediction::VerdictCounts;
use crate::nutrition::bmi::calculate_bmi;
use crate::nutrition::{AnalyzeFoodRequest, UserProfile};

fn or_unknown<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_owned(), |v| v.to_string())
}

/// Assessment prompt for one food.
///
/// Anthropometrics are not validated: a zero height renders the BMI as
/// `inf`/`NaN` rather than failing.
pub fn build_prompt(request: &AnalyzeFoodRequest, profile: &UserProfile) -> String {
    let demographics = &profile.demographics;
    let height_m = demographics.height_cm / 100.0;
    let bmi = demographics.weight_kg / (height_m * height_m);
    let condition = profile.primary_condition;

    let diabetes_info = condition
        .includes_diabetes()
        .then(|| format!("BS: {} mg/dL", or_unknown(profile.blood_sugar())));
    let bp_info = condition.includes_hypertension().then(|| {
        let (systolic, diastolic) = profile.blood_pressure();
        format!("BP: {}/{}", or_unknown(systolic), or_unknown(diastolic))
    });

    let mut flags = String::new();
    if profile.other_conditions.kidney_disease {
        flags.push_str(", KD");
    }
    if profile.other_conditions.heart_disease {
        flags.push_str(", HD");
    }

    let status_line = format!(
        "{}{}",
        diabetes_info
            .as_deref()
            .map(|info| format!("DM: {info}"))
            .unwrap_or_default(),
        bp_info
            .as_deref()
            .map(|info| format!(" HT: {info}"))
            .unwrap_or_default(),
    );
    let bs_hint = if diabetes_info.is_some() { " (BS)" } else { "" };
    let bp_hint = if bp_info.is_some() { " (BP)" } else { "" };

    let name = or_unknown(profile.name.as_deref().filter(|n| !n.is_empty()));
    let age = or_unknown(demographics.age);
    let food = request
        .food_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or("Unnamed");
    let n = &request.nutrition;

    format!(
        "Assess if this food is Safe or Risky for the user.\n\
         \n\
         USER: {name}, {age}yo, BMI {bmi:.1}, {condition}{flags}\n\
         {status_line}\n\
         \n\
         FOOD: {food} | Cal: {cal} | Carbs: {carbs}g | Protein: {protein}g | Fat: {fat}g | \
         Na: {sodium}mg | Sugars: {sugars}g | Fiber: {fiber}g\n\
         \n\
         JSON: {{\"prediction\": \"Safe\"|\"Risky\", \"reasoning\": \"explain how this food \
         impacts the user's {condition} condition, blood levels{bs_hint}{bp_hint}, and BMI\"}}",
        cal = n.calories,
        carbs = n.carbohydrates,
        protein = n.protein,
        fat = n.fat,
        sodium = n.sodium,
        sugars = n.total_sugars,
        fiber = n.fiber,
    )
}

/// Daily tips prompt built from today's scan tally.
pub fn build_tips_prompt(
    profile: Option<&UserProfile>,
    todays_scans: usize,
    counts: VerdictCounts,
) -> String {
    let bmi = profile
        .map(|p| &p.demographics)
        .filter(|d| d.height_cm > 0.0 && d.weight_kg > 0.0)
        .map(|d| format!("{:.1}", calculate_bmi(d.height_cm, d.weight_kg)));
    let name = or_unknown(profile.and_then(|p| p.name.as_deref()));
    let age = or_unknown(profile.and_then(|p| p.demographics.age));
    let condition = or_unknown(profile.map(|p| p.primary_condition));
    let focus = profile.map_or_else(
        || "their health".to_owned(),
        |p| p.primary_condition.to_string(),
    );

    format!(
        "Generate 5 short actionable health tips.\n\
         \n\
         USER: {name}, {age}yo, BMI {bmi}, {condition}\n\
         TODAY: {safe} safe, {risky} risky scans ({todays_scans} total)\n\
         \n\
         Tips must address {focus} and today's eating patterns. JSON: \
         [{{\"content\":\"tip 1\"}}, {{\"content\":\"tip 2\"}}, {{\"content\":\"tip 3\"}}, \
         {{\"content\":\"tip 4\"}}, {{\"content\":\"tip 5\"}}]",
        bmi = or_unknown(bmi),
        safe = counts.safe,
        risky = counts.risky,
    )
}

/// Instruction sent with a label photo; the image itself travels separately.
pub fn build_image_prompt() -> String {
    "Extract nutrition facts from the image as JSON. <image>".to_owned()
}
