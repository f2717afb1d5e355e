use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiStandard {
    #[default]
    Who,
    Asian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obese,
}

#[derive(Debug, Clone, Serialize)]
pub struct BmiRange {
    pub range: &'static str,
    pub category: BmiCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct BmiReport {
    pub bmi: f64,
    pub category: BmiCategory,
    pub standard: BmiStandard,
    pub ranges: Vec<BmiRange>,
}

/// Returns 0 for non-positive inputs.
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

pub fn bmi_category(bmi: f64, standard: BmiStandard) -> BmiCategory {
    let (under, normal, over) = match standard {
        BmiStandard::Who => (18.5, 25.0, 30.0),
        BmiStandard::Asian => (17.5, 23.0, 28.0),
    };
    if bmi < under {
        BmiCategory::Underweight
    } else if bmi < normal {
        BmiCategory::NormalWeight
    } else if bmi < over {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

pub fn bmi_ranges(standard: BmiStandard) -> Vec<BmiRange> {
    let labels: [&'static str; 4] = match standard {
        BmiStandard::Who => ["< 18.50", "18.50 - 24.99", "25.00 - 29.99", "≥ 30.00"],
        BmiStandard::Asian => ["< 17.50", "17.50 - 22.99", "23.00 - 27.99", "≥ 28.00"],
    };
    let categories = [
        BmiCategory::Underweight,
        BmiCategory::NormalWeight,
        BmiCategory::Overweight,
        BmiCategory::Obese,
    ];
    labels
        .into_iter()
        .zip(categories)
        .map(|(range, category)| BmiRange { range, category })
        .collect()
}

pub fn analyze_bmi(height_cm: f64, weight_kg: f64, standard: BmiStandard) -> BmiReport {
    let bmi = calculate_bmi(height_cm, weight_kg);
    BmiReport {
        bmi,
        category: bmi_category(bmi, standard),
        standard,
        ranges: bmi_ranges(standard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_from_height_and_weight() {
        let bmi = calculate_bmi(180.0, 81.0);
        assert!((bmi - 25.0).abs() < 1e-9);
        assert_eq!(calculate_bmi(0.0, 70.0), 0.0);
    }

    #[test]
    fn asian_cutoffs_are_lower() {
        assert_eq!(bmi_category(24.0, BmiStandard::Who), BmiCategory::NormalWeight);
        assert_eq!(bmi_category(24.0, BmiStandard::Asian), BmiCategory::Overweight);
        assert_eq!(bmi_category(28.0, BmiStandard::Asian), BmiCategory::Obese);
        assert_eq!(bmi_category(17.0, BmiStandard::Who), BmiCategory::Underweight);
    }

    #[test]
    fn report_serializes_category_label() {
        let report = analyze_bmi(165.0, 60.0, BmiStandard::Who);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["category"], "Normal weight");
        assert_eq!(json["standard"], "who");
        assert_eq!(json["ranges"].as_array().map(Vec::len), Some(4));
    }
}
