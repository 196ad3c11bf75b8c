//! Session extraction
//!
//! The access token travels as `Authorization: Bearer <token>` or in the
//! `vm_session` cookie. API handlers take [`CurrentUser`] and answer 401
//! without a live session; page handlers take [`PageUser`] and redirect to
//! `/auth` instead.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use vm_common::auth::{Session, User};
use vm_common::db::sessions;

use crate::error::ApiError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "vm_session";

/// Token from the Authorization header, else from the session cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a fresh session
pub fn session_cookie(session: &Session) -> Option<HeaderValue> {
    let max_age = (session.expires_at - chrono::Utc::now()).num_seconds().max(0);
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, session.access_token, max_age
    ))
    .ok()
}

/// `Set-Cookie` value removing the session cookie
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("vm_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Look up the live session for a request, if any
pub async fn session_from_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Session>, ApiError> {
    let Some(token) = token_from_headers(headers) else {
        return Ok(None);
    };

    Ok(sessions::load_session(&state.db, &token).await?)
}

/// Signed-in caller of an API endpoint
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match session_from_headers(state, &parts.headers).await? {
            Some(session) => Ok(CurrentUser {
                user: session.user.clone(),
                session,
            }),
            None => Err(ApiError::Unauthorized("Not signed in".to_string())),
        }
    }
}

/// Signed-in viewer of a page
#[derive(Debug, Clone)]
pub struct PageUser(pub User);

/// Redirect to the sign-in page
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/auth").into_response()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for PageUser {
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match session_from_headers(state, &parts.headers).await {
            Ok(Some(session)) => Ok(PageUser(session.user)),
            Ok(None) => Err(AuthRedirect),
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed, sending to sign-in");
                Err(AuthRedirect)
            }
        }
    }
}
