//! vm-app library - ValueMatrix web application
//!
//! Serves the page shells, account/session endpoints, the three prediction
//! submit endpoints (forwarded to vm-proxy) and per-user prediction history.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use vm_common::events::EventBus;

pub mod api;
pub mod error;
pub mod pages;
pub mod proxy_client;
pub mod session;

pub use error::{ApiError, ApiResult};
pub use proxy_client::ProxyClient;

/// Auth events buffered per subscriber before it lags
const EVENT_BUS_CAPACITY: usize = 100;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Users, sessions and prediction history
    pub db: SqlitePool,
    /// Client for the prediction proxy
    pub proxy: Arc<ProxyClient>,
    /// Auth state changes, streamed to pages over SSE
    pub events: EventBus,
    /// Pending/last-result state of each user's predictive pages
    pub submissions: pages::SubmissionTracker,
    /// Lifetime of new and refreshed sessions
    pub session_ttl: chrono::Duration,
    /// Service startup time, for uptime in /health
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, proxy: ProxyClient, session_ttl: chrono::Duration) -> Self {
        Self {
            db,
            proxy: Arc::new(proxy),
            events: EventBus::new(EVENT_BUS_CAPACITY),
            submissions: pages::SubmissionTracker::new(),
            session_ttl,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let predict = Router::new()
        .route("/api/predict/manual", post(api::predict_manual))
        .route(
            "/api/predict/image",
            post(api::predict_image).layer(DefaultBodyLimit::max(api::predict::MAX_IMAGE_BYTES)),
        )
        .route("/api/predict/voice", post(api::predict_voice))
        .route("/api/predict/:page/state", get(api::get_page_state));

    let history = Router::new()
        .route("/api/history", get(api::list_history))
        .route("/api/history/:id", delete(api::delete_history_entry));

    Router::new()
        .merge(predict)
        .merge(history)
        .route("/api/navigation", get(api::get_navigation))
        .merge(api::auth_routes())
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
