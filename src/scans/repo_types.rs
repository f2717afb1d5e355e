use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::analysis::prediction::HealthPrediction;
use crate::nutrition::{Condition, NutritionData};

#[derive(Debug, FromRow)]
pub struct ScanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub nutrition: Json<NutritionData>,
    pub condition: String,
    pub prediction: Json<HealthPrediction>,
    pub image_key: Option<String>,
    pub created_at: OffsetDateTime,
}

/// A saved assessment in the user's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub nutrition_data: NutritionData,
    pub condition: Condition,
    pub prediction: HealthPrediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<ScanRow> for ScanRecord {
    type Error = anyhow::Error;

    fn try_from(r: ScanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            food_name: r.food_name,
            nutrition_data: r.nutrition.0,
            condition: r.condition.parse()?,
            prediction: r.prediction.0,
            image_key: r.image_key,
            created_at: r.created_at,
        })
    }
}

/// Fields of a scan record before it is persisted.
#[derive(Debug, Clone)]
pub struct NewScan {
    pub food_name: String,
    pub nutrition: NutritionData,
    pub condition: Condition,
    pub prediction: HealthPrediction,
}
