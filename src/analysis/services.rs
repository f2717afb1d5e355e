use anyhow::Context;
use time::{OffsetDateTime, Time};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::defaults::{default_daily_tips, TIP_BATCH};
use super::fallback::fallback_analysis;
use super::image::parse_image_llm_response;
use super::parser::parse_llm_response;
use super::prediction::{HealthPrediction, ImageAnalysis, Tip, Verdict, VerdictCounts};
use super::prompt::{build_image_prompt, build_prompt, build_tips_prompt};
use super::tips::parse_tips_from_llm;
use crate::inference::{ImagePayload, InferenceClient, InferenceError};
use crate::nutrition::{AnalyzeFoodRequest, Condition, UserProfile};
use crate::profile::repo::ProfileStore;
use crate::scans::repo::ScanStore;

pub const MANUAL_MODE_TIP: &str = "Switch to manual mode to enter nutritional values directly.";

/// Assesses manually entered label facts.
///
/// If the inference service cannot be reached the rule-based fallback is
/// used silently; a reply that cannot be interpreted degrades inside the
/// parser. Always yields a complete prediction.
#[instrument(skip_all, fields(food = request.food_name.as_deref().unwrap_or("")))]
pub async fn analyze_food(
    inference: &dyn InferenceClient,
    request: &AnalyzeFoodRequest,
    profile: &UserProfile,
) -> HealthPrediction {
    let missing = profile.missing_parts();
    if !missing.is_empty() {
        warn!(?missing, "profile fields missing before inference request");
    }

    let prompt = build_prompt(request, profile);
    match inference.predict(&prompt).await {
        Ok(output) => parse_llm_response(&output),
        Err(e) => {
            error!(error = %e, "inference request failed");
            warn!(degraded = true, "falling back to rule-based analysis");
            fallback_analysis(request)
        }
    }
}

/// Assesses a label photo.
///
/// Unlike [`analyze_food`], an unreachable service is reported back to the
/// user: there is no rule-based substitute for reading the photo. When label
/// facts are recovered they go through a second, text-only assessment.
#[instrument(skip_all, fields(content_type = %image.content_type))]
pub async fn analyze_image(
    inference: &dyn InferenceClient,
    image: &ImagePayload,
    profile: Option<&UserProfile>,
) -> ImageAnalysis {
    let prompt = build_image_prompt();
    let output = match inference.extract_from_image(&prompt, image).await {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "image inference request failed");
            return ImageAnalysis {
                prediction: manual_mode_prediction(&e),
                nutrition_data: None,
            };
        }
    };

    let parsed = parse_image_llm_response(&output);
    let Some(nutrition) = parsed.nutrition_data.clone() else {
        return parsed;
    };

    let request = AnalyzeFoodRequest {
        food_name: None,
        condition: Some(profile.map_or(Condition::Both, |p| p.primary_condition)),
        nutrition,
    };
    let prediction = match profile {
        Some(profile) => analyze_food(inference, &request, profile).await,
        None => {
            warn!(degraded = true, "no profile for follow-up assessment; using rule-based analysis");
            fallback_analysis(&request)
        }
    };

    ImageAnalysis {
        prediction,
        nutrition_data: Some(request.nutrition),
    }
}

fn manual_mode_prediction(cause: &InferenceError) -> HealthPrediction {
    HealthPrediction {
        verdict: Verdict::Risky,
        reasoning: format!(
            "Error: Unable to connect to the nutrition analysis service. Please switch to \
             manual mode and try entering the text directly. ({cause})"
        ),
        tips: vec![Tip::new(MANUAL_MODE_TIP)],
    }
}

pub fn start_of_day(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_time(Time::MIDNIGHT)
}

/// Regenerates the user's stored tips from today's scans.
///
/// A reply that is not exactly five tips is replaced by the default daily
/// batch; an unreachable service is an error and leaves stored tips alone.
#[instrument(skip(inference, scans, profiles))]
pub async fn generate_daily_tips(
    inference: &dyn InferenceClient,
    scans: &dyn ScanStore,
    profiles: &dyn ProfileStore,
    user_id: Uuid,
    now: OffsetDateTime,
) -> anyhow::Result<Vec<Tip>> {
    let profile = profiles.get_profile(user_id).await?;
    let history = scans.list_by_user(user_id).await?;

    let since = start_of_day(now);
    let todays: Vec<Verdict> = history
        .iter()
        .filter(|scan| scan.created_at >= since)
        .map(|scan| scan.prediction.verdict)
        .collect();
    let counts = VerdictCounts::tally(todays.iter().copied());

    let prompt = build_tips_prompt(profile.as_ref(), todays.len(), counts);
    let raw = inference
        .predict(&prompt)
        .await
        .context("daily tips inference")?;

    let tips = match parse_tips_from_llm(&raw) {
        Some(tips) if tips.len() == TIP_BATCH => tips,
        other => {
            warn!(
                returned = other.as_ref().map_or(0, Vec::len),
                "model did not return a full tip batch; using default tips"
            );
            default_daily_tips().to_vec()
        }
    };

    profiles.update_tips(user_id, &tips).await?;
    info!(%user_id, safe = counts.safe, risky = counts.risky, "daily tips updated");
    Ok(tips)
}
