//! Chat-completion gateway client
//!
//! One POST to `{base_url}/chat/completions` per prediction. The first
//! choice's message content is expected to be a JSON object and is returned
//! as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use vm_common::config::GatewayConfig;

use crate::error::{ProxyError, ProxyResult, GENERIC_UPSTREAM_FAILURE};
use crate::prompt::ChatMessage;

const USER_AGENT: &str = concat!("ValueMatrix/", env!("CARGO_PKG_VERSION"));

/// Resolved gateway settings
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

impl GatewaySettings {
    pub fn from_config(config: &GatewayConfig, api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Gateway API client
pub struct GatewayClient {
    http_client: reqwest::Client,
    settings: GatewaySettings,
}

impl GatewayClient {
    pub fn new(settings: GatewaySettings) -> ProxyResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| ProxyError::Internal(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.settings.api_key.is_some()
    }

    /// Send the messages and return the parsed JSON reply
    pub async fn complete(&self, messages: &[ChatMessage]) -> ProxyResult<Value> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProxyError::MissingApiKey)?;

        let request = CompletionRequest {
            model: &self.settings.model,
            messages,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(model = %self.settings.model, "Calling AI gateway");

        let response = self
            .http_client
            .post(self.settings.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProxyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "AI gateway error");
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProxyError::MalformedResponse(e.to_string()))?;

        parse_completion(completion)
    }
}

fn parse_completion(completion: CompletionResponse) -> ProxyResult<Value> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProxyError::MalformedResponse("no message content".to_string()))?;

    tracing::debug!(content = %content, "AI gateway reply");

    serde_json::from_str(&content).map_err(|e| ProxyError::MalformedResponse(e.to_string()))
}

/// `error.message` from an upstream error body, or the generic failure text
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| GENERIC_UPSTREAM_FAILURE.to_string())
}
