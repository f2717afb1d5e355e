use serde::{Deserialize, Serialize};

use crate::nutrition::NutritionData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Risky,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "Safe",
            Verdict::Risky => "Risky",
        }
    }

    pub fn is_risky(self) -> bool {
        self == Verdict::Risky
    }
}

/// Short actionable suggestion. Position matters to clients, which style
/// tips by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub content: String,
}

impl Tip {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Assessment of one food against the user's condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPrediction {
    #[serde(rename = "prediction")]
    pub verdict: Verdict,
    pub reasoning: String,
    #[serde(rename = "healthTip")]
    pub tips: Vec<Tip>,
}

/// Result of the image path: the prediction plus whatever label facts were
/// read off the photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    #[serde(flatten)]
    pub prediction: HealthPrediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition_data: Option<NutritionData>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    pub safe: usize,
    pub risky: usize,
}

impl VerdictCounts {
    pub fn tally(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        verdicts
            .into_iter()
            .fold(Self::default(), |mut counts, verdict| {
                match verdict {
                    Verdict::Safe => counts.safe += 1,
                    Verdict::Risky => counts.risky += 1,
                }
                counts
            })
    }
}
