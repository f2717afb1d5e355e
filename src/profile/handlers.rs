use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument};

use super::dto::{BmiQuery, ProfileResponse};
use crate::analysis::prediction::Tip;
use crate::analysis::services::generate_daily_tips;
use crate::auth::AuthUser;
use crate::nutrition::bmi::{analyze_bmi, BmiReport};
use crate::nutrition::UserProfile;
use crate::state::AppState;

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/profile/bmi", get(get_bmi))
        .route("/tips", get(get_tips))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(put_profile))
        .route("/tips/daily", post(refresh_daily_tips))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    match state.profiles.get_profile(user_id).await.map_err(internal)? {
        Some(profile) => Ok(Json(profile.into())),
        None => Err((StatusCode::NOT_FOUND, "Profile not found".into())),
    }
}

#[instrument(skip(state, profile))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(profile): Json<UserProfile>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    state
        .profiles
        .put_profile(user_id, &profile)
        .await
        .map_err(internal)?;
    info!(%user_id, complete = profile.is_complete(), "profile saved");
    Ok(Json(profile.into()))
}

/// GET /profile/bmi?standard=who|asian
#[instrument(skip(state))]
pub async fn get_bmi(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<BmiQuery>,
) -> Result<Json<BmiReport>, (StatusCode, String)> {
    let Some(profile) = state.profiles.get_profile(user_id).await.map_err(internal)? else {
        return Err((StatusCode::NOT_FOUND, "Profile not found".into()));
    };
    let d = &profile.demographics;
    Ok(Json(analyze_bmi(d.height_cm, d.weight_kg, q.standard)))
}

#[instrument(skip(state))]
pub async fn get_tips(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Tip>>, (StatusCode, String)> {
    let tips = state.profiles.get_tips(user_id).await.map_err(internal)?;
    Ok(Json(tips))
}

#[instrument(skip(state))]
pub async fn refresh_daily_tips(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Tip>>, (StatusCode, String)> {
    let tips = generate_daily_tips(
        state.inference.as_ref(),
        state.scans.as_ref(),
        state.profiles.as_ref(),
        user_id,
        OffsetDateTime::now_utc(),
    )
    .await
    .map_err(|e| {
        error!(error = %e, %user_id, "daily tips generation failed");
        (StatusCode::BAD_GATEWAY, "Unable to generate tips right now".into())
    })?;
    Ok(Json(tips))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
