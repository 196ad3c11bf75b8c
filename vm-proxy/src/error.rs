//! Error types for vm-proxy
//!
//! Every failure is reported to the caller the same way: HTTP 500 with
//! `{"error": "<message>"}`. The variants only decide the message and what
//! gets logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Fallback when the gateway rejects a call without saying why
pub const GENERIC_UPSTREAM_FAILURE: &str = "AI prediction failed";

#[derive(Debug, Error)]
pub enum ProxyError {
    /// No gateway API key configured
    #[error("Gateway API key not configured")]
    MissingApiKey,

    /// Request body is not a valid `{type, data}` payload
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Gateway unreachable or connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// Gateway answered with a non-success status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Gateway reply did not contain a JSON prediction
    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    /// HTTP client construction failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Error in predict-price");

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
