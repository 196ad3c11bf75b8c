//! HTTP client for the prediction proxy

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use vm_common::models::PredictionRequest;

const USER_AGENT: &str = concat!("ValueMatrix-App/", env!("CARGO_PKG_VERSION"));

/// Shown when the proxy gives no usable message
pub const GENERIC_PREDICTION_FAILURE: &str = "Failed to predict price";

/// Proxy client errors
#[derive(Debug, Error)]
pub enum ProxyClientError {
    #[error("Network error: {0}")]
    Network(String),

    /// Proxy answered non-2xx with `{"error": message}`
    #[error("Proxy error {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ProxyClientError {
    /// Notification text for the page
    pub fn user_message(&self) -> String {
        match self {
            ProxyClientError::Rejected { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => GENERIC_PREDICTION_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    error: Option<String>,
}

/// Prediction proxy client
pub struct ProxyClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ProxyClientError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| ProxyClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /predict-price, returning the proxy's JSON reply untouched
    pub async fn predict(&self, request: &PredictionRequest) -> Result<Value, ProxyClientError> {
        let url = format!("{}/predict-price", self.base_url);

        tracing::debug!(
            prediction_type = %request.prediction_type(),
            url = %url,
            "Calling prediction proxy"
        );

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProxyClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ProxyErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_default();
            return Err(ProxyClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProxyClientError::Parse(e.to_string()))
    }
}
