use serde::{Deserialize, Serialize};

use crate::nutrition::UserProfile;
use crate::nutrition::bmi::BmiStandard;

#[derive(Debug, Deserialize)]
pub struct BmiQuery {
    #[serde(default)]
    pub standard: BmiStandard,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_complete: bool,
    pub missing: Vec<&'static str>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            is_complete: profile.is_complete(),
            missing: profile.missing_parts(),
            profile,
        }
    }
}
