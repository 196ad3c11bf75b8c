//! Navigation bar contents

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::error::ApiResult;
use crate::session::session_from_headers;
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
}

pub const NAV_ITEMS: [NavItem; 5] = [
    NavItem { path: "/", label: "Home" },
    NavItem { path: "/predict", label: "Manual Predict" },
    NavItem { path: "/image-predict", label: "Image Predict" },
    NavItem { path: "/voice-predict", label: "Voice Predict" },
    NavItem { path: "/history", label: "History" },
];

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub items: Vec<NavItem>,
}

/// GET /api/navigation
pub async fn get_navigation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<NavigationResponse>> {
    let session = session_from_headers(&state, &headers).await?;

    Ok(Json(NavigationResponse {
        signed_in: session.is_some(),
        email: session.map(|s| s.user.email),
        items: NAV_ITEMS.to_vec(),
    }))
}
