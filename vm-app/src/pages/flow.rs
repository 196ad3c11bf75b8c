//! Shared submit flow for the predictive pages

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use vm_common::auth::User;
use vm_common::db::predictions;
use vm_common::format::format_inr;
use vm_common::models::{NewPrediction, Prediction, PredictionRequest};

use crate::error::{ApiError, ApiResult};
use crate::pages::{Notification, PageKind};
use crate::proxy_client::GENERIC_PREDICTION_FAILURE;
use crate::AppState;

/// What the page renders after a successful prediction
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    /// Proxy reply, unchanged
    pub prediction: Value,
    /// Indian-locale rupee string, e.g. `₹75,00,000`
    pub price_display: String,
    pub notification: Notification,
}

/// Submit a gated request for `user` from `page`
///
/// Rejects with 409 while another submission for the same page is pending.
/// After a successful proxy call the history row is written best-effort:
/// a failed write is logged and the outcome is returned unchanged.
pub async fn run_prediction(
    state: &AppState,
    user: &User,
    page: PageKind,
    request: PredictionRequest,
) -> ApiResult<PredictionOutcome> {
    let submission = state
        .submissions
        .try_begin(user.id, page)
        .ok_or_else(|| ApiError::Conflict("A prediction is already in progress".to_string()))?;

    info!(user_id = %user.id, page = %page, "Submitting prediction");

    let reply = state.proxy.predict(&request).await.map_err(|e| {
        warn!(user_id = %user.id, page = %page, error = %e, "Prediction failed");
        ApiError::Prediction(e.user_message())
    })?;

    let prediction = Prediction::from_value(&reply).map_err(|e| {
        warn!(user_id = %user.id, page = %page, error = %e, "Prediction reply unusable");
        ApiError::Prediction(GENERIC_PREDICTION_FAILURE.to_string())
    })?;

    let price_display = format_inr(prediction.predicted_price);
    submission.succeed(&price_display);

    save_history(state, user, &request, prediction.predicted_price).await;

    info!(
        user_id = %user.id,
        page = %page,
        predicted_price = prediction.predicted_price,
        "Prediction complete"
    );

    Ok(PredictionOutcome {
        prediction: reply,
        notification: Notification::prediction_complete(&price_display),
        price_display,
    })
}

async fn save_history(state: &AppState, user: &User, request: &PredictionRequest, price: f64) {
    let row = NewPrediction::from_request(user.id, request, price);

    match predictions::insert_prediction(&state.db, &row).await {
        Ok(saved) => {
            info!(user_id = %user.id, prediction_id = %saved.id, "Prediction saved to history");
        }
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "Error saving prediction");
        }
    }
}
