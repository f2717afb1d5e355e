use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Redirect,
    routing::{delete, get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{HistoryQuery, SaveScanRequest, ScanStats};
use super::repo_types::{NewScan, ScanRecord};
use crate::analysis::prediction::{HealthPrediction, ImageAnalysis};
use crate::analysis::services::{self, start_of_day};
use crate::auth::AuthUser;
use crate::inference::ImagePayload;
use crate::nutrition::{AnalyzeFoodRequest, UserProfile};
use crate::state::AppState;

pub const INCOMPLETE_PROFILE: &str = "Please complete your health profile first.";
const PRESIGN_SECONDS: u64 = 600;

// --- public routers ---

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/scans", get(list_scans))
        .route("/scans/stats", get(scan_stats))
        .route("/scans/:id/image", get(get_scan_image)) // 302 to a presigned url
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/scans", post(save_scan))
        .route("/scans/analyze", post(analyze_scan))
        .route("/scans/analyze-image", post(analyze_scan_image))
        .route("/scans/:id", delete(delete_scan))
        .route("/scans/:id/image", put(attach_scan_image))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

// --- handlers ---

/// POST /scans/analyze
#[instrument(skip(state, body))]
pub async fn analyze_scan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AnalyzeFoodRequest>,
) -> Result<Json<HealthPrediction>, (StatusCode, String)> {
    let profile = complete_profile(&state, user_id).await?;
    let prediction = services::analyze_food(state.inference.as_ref(), &body, &profile).await;
    info!(%user_id, verdict = prediction.verdict.as_str(), "food analyzed");
    Ok(Json(prediction))
}

/// POST /scans/analyze-image (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn analyze_scan_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Multipart,
) -> Result<Json<ImageAnalysis>, (StatusCode, String)> {
    let image = read_image(mp).await?;
    let profile = state.profiles.get_profile(user_id).await.map_err(internal)?;
    let analysis =
        services::analyze_image(state.inference.as_ref(), &image, profile.as_ref()).await;
    info!(
        %user_id,
        verdict = analysis.prediction.verdict.as_str(),
        facts = analysis.nutrition_data.is_some(),
        "label photo analyzed"
    );
    Ok(Json(analysis))
}

/// POST /scans
///
/// Stores the assessment, copies its tips onto the profile and then
/// refreshes the daily tips. Tip failures are logged; the record stays.
#[instrument(skip(state, body))]
pub async fn save_scan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SaveScanRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ScanRecord>), (StatusCode, String)> {
    let scan = NewScan {
        food_name: body.display_name(),
        nutrition: body.nutrition_data,
        condition: body.condition,
        prediction: body.prediction,
    };
    let record = state
        .scans
        .insert_scan(user_id, scan)
        .await
        .map_err(internal)?;

    if !record.prediction.tips.is_empty() {
        if let Err(e) = state
            .profiles
            .update_tips(user_id, &record.prediction.tips)
            .await
        {
            warn!(error = %e, %user_id, "failed to store scan tips");
        }
    }

    if let Err(e) = services::generate_daily_tips(
        state.inference.as_ref(),
        state.scans.as_ref(),
        state.profiles.as_ref(),
        user_id,
        OffsetDateTime::now_utc(),
    )
    .await
    {
        error!(error = %e, %user_id, "daily tips refresh failed");
    }

    let mut headers = HeaderMap::new();
    let location: HeaderValue = format!("/api/v1/scans/{}", record.id)
        .parse()
        .map_err(internal)?;
    headers.insert(header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(record)))
}

/// GET /scans?condition=diabetes|hypertension|both
#[instrument(skip(state))]
pub async fn list_scans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<ScanRecord>>, (StatusCode, String)> {
    let records = match q.condition {
        Some(condition) => state.scans.list_by_condition(user_id, condition).await,
        None => state.scans.list_by_user(user_id).await,
    }
    .map_err(internal)?;
    Ok(Json(records))
}

#[instrument(skip(state))]
pub async fn scan_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ScanStats>, (StatusCode, String)> {
    let records = state.scans.list_by_user(user_id).await.map_err(internal)?;
    let since = start_of_day(OffsetDateTime::now_utc());
    Ok(Json(ScanStats::from_history(&records, since)))
}

#[instrument(skip(state))]
pub async fn delete_scan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let record = find_scan(&state, user_id, id).await?;
    state.scans.delete_scan(user_id, id).await.map_err(internal)?;

    if let Some(key) = record.image_key.as_deref() {
        if let Err(e) = state.images.delete_scan_image(key).await {
            warn!(error = %e, %key, "orphaned scan image");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /scans/:id/image (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn attach_scan_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<StatusCode, (StatusCode, String)> {
    find_scan(&state, user_id, id).await?;
    let image = read_image(mp).await?;

    let key = state
        .images
        .put_scan_image(user_id, id, image.body, &image.content_type)
        .await
        .map_err(internal)?;
    state
        .scans
        .set_image_key(user_id, id, &key)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_scan_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, (StatusCode, String)> {
    let record = find_scan(&state, user_id, id).await?;
    let Some(key) = record.image_key else {
        return Err((StatusCode::NOT_FOUND, "Image not found".into()));
    };
    let url = state
        .images
        .presign_scan_image(&key, PRESIGN_SECONDS)
        .await
        .map_err(internal)?;
    Ok(Redirect::temporary(&url))
}

// --- helpers ---

async fn complete_profile(
    state: &AppState,
    user_id: Uuid,
) -> Result<UserProfile, (StatusCode, String)> {
    match state.profiles.get_profile(user_id).await.map_err(internal)? {
        Some(profile) if profile.is_complete() => Ok(profile),
        _ => {
            warn!(%user_id, "analysis requested without a complete profile");
            Err((StatusCode::BAD_REQUEST, INCOMPLETE_PROFILE.into()))
        }
    }
}

async fn find_scan(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<ScanRecord, (StatusCode, String)> {
    state
        .scans
        .get_scan(user_id, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Scan not found".into()))
}

async fn read_image(mut mp: Multipart) -> Result<ImagePayload, (StatusCode, String)> {
    while let Some(field) = mp.next_field().await.map_err(bad_request)? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await.map_err(bad_request)?;
        if body.is_empty() {
            break;
        }
        return Ok(ImagePayload { body, content_type });
    }
    Err((StatusCode::BAD_REQUEST, "image is required".into()))
}

fn bad_request<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
