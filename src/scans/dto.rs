use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::ScanRecord;
use crate::analysis::prediction::{HealthPrediction, VerdictCounts};
use crate::nutrition::{Condition, NutritionData};

pub const UNNAMED_FOOD: &str = "Unnamed Food";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScanRequest {
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub nutrition_data: NutritionData,
    pub condition: Condition,
    pub prediction: HealthPrediction,
}

impl SaveScanRequest {
    pub fn display_name(&self) -> String {
        self.food_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNNAMED_FOOD)
            .to_owned()
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub condition: Option<Condition>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub total_scans: usize,
    pub scans_today: usize,
    pub safe_scans: usize,
    pub risky_scans: usize,
}

impl ScanStats {
    /// Safe/risky counts cover the whole history; `scans_today` counts
    /// records created at or after `start_of_day`.
    pub fn from_history(records: &[ScanRecord], start_of_day: OffsetDateTime) -> Self {
        let counts = VerdictCounts::tally(records.iter().map(|r| r.prediction.verdict));
        Self {
            total_scans: records.len(),
            scans_today: records
                .iter()
                .filter(|r| r.created_at >= start_of_day)
                .count(),
            safe_scans: counts.safe,
            risky_scans: counts.risky,
        }
    }
}
