//! UI routes - HTML page shells
//!
//! Pages other than home and sign-in need a session and send the browser to
//! `/auth` without one.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::session::{session_from_headers, PageUser};
use crate::AppState;

const HOME_HTML: &str = include_str!("../ui/home.html");
const AUTH_HTML: &str = include_str!("../ui/auth.html");
const PREDICT_HTML: &str = include_str!("../ui/predict.html");
const IMAGE_PREDICT_HTML: &str = include_str!("../ui/image_predict.html");
const VOICE_PREDICT_HTML: &str = include_str!("../ui/voice_predict.html");
const HISTORY_HTML: &str = include_str!("../ui/history.html");
const APP_JS: &str = include_str!("../ui/app.js");
const APP_CSS: &str = include_str!("../ui/app.css");

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/auth", get(auth_page))
        .route("/predict", get(predict_page))
        .route("/image-predict", get(image_predict_page))
        .route("/voice-predict", get(voice_predict_page))
        .route("/history", get(history_page))
        .route("/static/app.js", get(serve_app_js))
        .route("/static/app.css", get(serve_app_css))
}

async fn home_page() -> Html<&'static str> {
    Html(HOME_HTML)
}

/// Signed-in visitors go straight home
async fn auth_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match session_from_headers(&state, &headers).await {
        Ok(Some(_)) => Redirect::to("/").into_response(),
        _ => Html(AUTH_HTML).into_response(),
    }
}

async fn predict_page(_user: PageUser) -> Html<&'static str> {
    Html(PREDICT_HTML)
}

async fn image_predict_page(_user: PageUser) -> Html<&'static str> {
    Html(IMAGE_PREDICT_HTML)
}

async fn voice_predict_page(_user: PageUser) -> Html<&'static str> {
    Html(VOICE_PREDICT_HTML)
}

async fn history_page(_user: PageUser) -> Html<&'static str> {
    Html(HISTORY_HTML)
}

async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        APP_JS,
    )
        .into_response()
}

async fn serve_app_css() -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/css")], APP_CSS).into_response()
}
