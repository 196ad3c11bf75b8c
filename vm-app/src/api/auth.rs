//! Account and session endpoints
//!
//! Sign-up, sign-in, sign-out and refresh all announce the change on the
//! event bus so open pages can follow along over `/auth/events`.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use vm_common::auth::{Session, User};
use vm_common::db::{sessions, users};
use vm_common::events::AuthEvent;
use vm_common::sse::auth_event_stream;

use crate::error::{ApiError, ApiResult};
use crate::pages::Notification;
use crate::session::{clear_session_cookie, session_cookie, session_from_headers, CurrentUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub session: Session,
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub notification: Notification,
}

/// Build auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/refresh", post(refresh))
        .route("/auth/session", get(current_session))
        .route("/auth/events", get(auth_events))
}

fn with_session_cookie(status: StatusCode, session: Session) -> Response {
    let cookie = session_cookie(&session);
    let mut response = (status, Json(AuthResponse {
        user: session.user.clone(),
        session,
    }))
        .into_response();

    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// POST /auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> ApiResult<Response> {
    let user = users::create_user(&state.db, &credentials.email, &credentials.password).await?;
    let session = sessions::create_session(&state.db, &user, state.session_ttl).await?;

    info!(user_id = %user.id, "Account created");
    state.events.emit(AuthEvent::signed_in(user.id));

    Ok(with_session_cookie(StatusCode::CREATED, session))
}

/// POST /auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> ApiResult<Response> {
    let user = users::authenticate(&state.db, &credentials.email, &credentials.password).await?;
    let session = sessions::create_session(&state.db, &user, state.session_ttl).await?;

    info!(user_id = %user.id, "Signed in");
    state.events.emit(AuthEvent::signed_in(user.id));

    Ok(with_session_cookie(StatusCode::OK, session))
}

/// POST /auth/sign-out
///
/// Ends every session of the caller, so all of their open pages follow the
/// `SignedOut` event back to the sign-in page.
pub async fn sign_out(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Response> {
    let ended = sessions::delete_user_sessions(&state.db, current.user.id).await?;

    info!(user_id = %current.user.id, sessions = ended, "Signed out");
    state.events.emit(AuthEvent::signed_out(current.user.id));

    let mut response = Json(SignOutResponse {
        notification: Notification::signed_out(),
    })
    .into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, clear_session_cookie());
    Ok(response)
}

/// POST /auth/refresh
pub async fn refresh(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Response> {
    let session = sessions::refresh_session(&state.db, &current.session.access_token, state.session_ttl)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Session expired".to_string()))?;

    state
        .events
        .emit(AuthEvent::token_refreshed(session.user.id, session.expires_at));

    Ok(with_session_cookie(StatusCode::OK, session))
}

/// GET /auth/session
///
/// The caller's session, or `null` when signed out.
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Option<Session>>> {
    Ok(Json(session_from_headers(&state, &headers).await?))
}

/// GET /auth/events
pub async fn auth_events(State(state): State<AppState>, current: CurrentUser) -> impl IntoResponse {
    auth_event_stream(&state.events, current.user.id)
}
