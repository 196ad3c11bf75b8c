//! Prediction submit endpoints for the three pages

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::pages::{
    image::image_request, manual::ManualForm, run_prediction, voice::VoiceForm, PageKind,
    PageState, PredictionOutcome,
};
use crate::session::CurrentUser;
use crate::AppState;

/// Largest accepted image upload
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Body bytes, with axum's own rejections turned into notifying errors
fn read_body(body: Result<Bytes, BytesRejection>) -> ApiResult<Bytes> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!(
                "Image is too large (limit {} MB)",
                MAX_IMAGE_BYTES / (1024 * 1024)
            ))
        } else {
            ApiError::BadRequest(format!("Could not read request: {}", rejection.body_text()))
        }
    })
}

/// Decode a JSON form body regardless of its Content-Type
fn parse_form<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))
}

/// POST /api/predict/manual
pub async fn predict_manual(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<PredictionOutcome>> {
    let form: ManualForm = parse_form(&read_body(body)?)?;
    let request = form.validate()?;
    let outcome = run_prediction(&state, &current.user, PageKind::Manual, request).await?;
    Ok(Json(outcome))
}

/// POST /api/predict/image
///
/// Body is the raw image file.
pub async fn predict_image(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<PredictionOutcome>> {
    let body = read_body(body)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let request = image_request(&body, content_type)?;
    let outcome = run_prediction(&state, &current.user, PageKind::Image, request).await?;
    Ok(Json(outcome))
}

/// POST /api/predict/voice
pub async fn predict_voice(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<PredictionOutcome>> {
    let form: VoiceForm = parse_form(&read_body(body)?)?;
    let request = form.validate()?;
    let outcome = run_prediction(&state, &current.user, PageKind::Voice, request).await?;
    Ok(Json(outcome))
}

/// GET /api/predict/:page/state
pub async fn get_page_state(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(page): Path<PageKind>,
) -> Json<PageState> {
    Json(state.submissions.state(current.user.id, page))
}
