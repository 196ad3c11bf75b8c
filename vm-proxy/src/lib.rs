//! vm-proxy library - prediction proxy
//!
//! Single public operation `POST /predict-price`: turns a manual, image or
//! voice request into a chat-completion call and returns the model's JSON
//! reply.

use axum::{
    http::{header, HeaderName, Method},
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod gateway;
pub mod prompt;

pub use error::{ProxyError, ProxyResult};
pub use gateway::{GatewayClient, GatewaySettings};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Chat-completion gateway client
    pub gateway: Arc<GatewayClient>,
    /// Service startup time, for uptime in /health
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(gateway: GatewayClient) -> Self {
        Self {
            gateway: Arc::new(gateway),
            startup_time: Utc::now(),
        }
    }
}

/// Browser callers send these headers on the preflight
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/predict-price", post(api::predict_price))
        .merge(api::health_routes())
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
