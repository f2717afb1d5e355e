pub mod bmi;
pub mod coerce;
pub mod model;

pub use model::{AnalyzeFoodRequest, Condition, NutritionData, UserProfile};
