//! Error types for vm-app
//!
//! Every error body carries both a machine-readable `error` object and the
//! `notification` the page shows for it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pages::notify::Notification;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request or failed form gate (400)
    #[error("{0}")]
    BadRequest(String),

    /// Missing or expired session (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Resource not found or not owned by the caller (404)
    #[error("{0}")]
    NotFound(String),

    /// Conflict (409) - a prediction for this page is already pending
    #[error("{0}")]
    Conflict(String),

    /// Upload over the size limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Prediction proxy failed (502)
    #[error("{0}")]
    Prediction(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// vm-common error
    #[error(transparent)]
    Common(#[from] vm_common::Error),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        use vm_common::Error as Common;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::Prediction(_) => (StatusCode::BAD_GATEWAY, "PREDICTION_FAILED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Common(Common::InvalidInput(_)) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Common(Common::Unauthorized(_)) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Common(Common::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
        }
    }

    /// Text shown to the user
    pub fn message(&self) -> String {
        match self {
            ApiError::Common(vm_common::Error::InvalidInput(msg))
            | ApiError::Common(vm_common::Error::Unauthorized(msg))
            | ApiError::Common(vm_common::Error::NotFound(msg)) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %self, "Request failed");
        } else {
            tracing::debug!(code = error_code, error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            },
            "notification": Notification::error(&message),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_prediction_failure_is_destructive_notification() {
        let (status, body) = body_of(ApiError::Prediction("Rate limits exceeded".to_string())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "PREDICTION_FAILED");
        assert_eq!(body["notification"]["title"], "Error");
        assert_eq!(body["notification"]["description"], "Rate limits exceeded");
        assert_eq!(body["notification"]["variant"], "destructive");
    }

    #[tokio::test]
    async fn test_common_errors_map_by_kind() {
        let cases = [
            (vm_common::Error::InvalidInput("User already registered".into()), StatusCode::BAD_REQUEST),
            (vm_common::Error::Unauthorized("Invalid login credentials".into()), StatusCode::UNAUTHORIZED),
            (vm_common::Error::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (vm_common::Error::Config("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let (status, _) = body_of(ApiError::from(error)).await;
            assert_eq!(status, expected);
        }

        let (_, body) = body_of(vm_common::Error::Unauthorized("Invalid login credentials".into()).into()).await;
        assert_eq!(body["error"]["message"], "Invalid login credentials");
    }
}
