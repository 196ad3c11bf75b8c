//! POST /predict-price
//!
//! Accepts `{type, data}`, asks the gateway for a prediction and returns the
//! gateway's JSON reply unchanged.

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;
use vm_common::models::{PredictionRequest, PredictionType};

use crate::error::{ProxyError, ProxyResult};
use crate::prompt::build_messages;
use crate::AppState;

pub async fn predict_price(State(state): State<AppState>, body: Bytes) -> ProxyResult<Json<Value>> {
    // Credential is checked before the body is looked at
    if !state.gateway.has_api_key() {
        return Err(ProxyError::MissingApiKey);
    }

    let request = parse_request(&body)?;
    let prediction_type = request.prediction_type();
    tracing::info!(prediction_type = %prediction_type, "Processing prediction request");

    let messages = build_messages(&request)?;
    let prediction = state.gateway.complete(&messages).await?;

    tracing::info!(prediction_type = %prediction_type, "Prediction completed");
    Ok(Json(prediction))
}

/// Decode the request body, reporting unknown types separately from bad payloads
pub fn parse_request(body: &[u8]) -> ProxyResult<PredictionRequest> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ProxyError::InvalidRequest(format!("body is not JSON: {}", e)))?;

    let type_name = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProxyError::InvalidRequest("missing prediction type".to_string()))?;

    if type_name.parse::<PredictionType>().is_err() {
        return Err(ProxyError::InvalidRequest("Invalid prediction type".to_string()));
    }

    serde_json::from_value(value).map_err(|e| ProxyError::InvalidRequest(e.to_string()))
}
