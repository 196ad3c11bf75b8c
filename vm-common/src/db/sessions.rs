//! Session storage for the auth provider
//!
//! Sessions are keyed by the SHA-256 digest of their token. An expired
//! session is removed the first time it is presented. Signing out ends all
//! of a user's sessions at once.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::users::user_from_parts;
use super::{from_db_timestamp, to_db_timestamp};
use crate::auth::{self, Session, User};
use crate::Result;

/// Issue a new session for `user`, valid for `ttl`
pub async fn create_session(pool: &SqlitePool, user: &User, ttl: Duration) -> Result<Session> {
    let token = auth::generate_token();
    let now = Utc::now();
    let expires_at = now + ttl;

    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(auth::hash_token(&token))
    .bind(user.id.to_string())
    .bind(to_db_timestamp(&now))
    .bind(to_db_timestamp(&expires_at))
    .execute(pool)
    .await?;

    tracing::debug!(user_id = %user.id, expires_at = %expires_at, "Session issued");

    Ok(Session::new(token, expires_at, user.clone()))
}

/// Resolve a token to its live session
///
/// Returns `None` for unknown or expired tokens.
pub async fn load_session(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    let token_hash = auth::hash_token(token);

    let row: Option<(String, String, String, String)> = sqlx::query_as(
        r#"
        SELECT u.id, u.email, u.created_at, s.expires_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = ?
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await?;

    let Some((id, email, created_at, expires_at)) = row else {
        return Ok(None);
    };

    let expires_at = from_db_timestamp("sessions.expires_at", &expires_at)?;
    if expires_at <= Utc::now() {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(pool)
            .await?;
        tracing::debug!("Expired session removed");
        return Ok(None);
    }

    let user = user_from_parts(id, email, created_at)?;
    Ok(Some(Session::new(token.to_string(), expires_at, user)))
}

/// Extend a live session to `now + ttl`
pub async fn refresh_session(pool: &SqlitePool, token: &str, ttl: Duration) -> Result<Option<Session>> {
    let Some(session) = load_session(pool, token).await? else {
        return Ok(None);
    };

    let expires_at: DateTime<Utc> = Utc::now() + ttl;
    sqlx::query("UPDATE sessions SET expires_at = ? WHERE token_hash = ?")
        .bind(to_db_timestamp(&expires_at))
        .bind(auth::hash_token(token))
        .execute(pool)
        .await?;

    Ok(Some(Session::new(session.access_token, expires_at, session.user)))
}

/// End every session of `user_id`; returns how many were removed
pub async fn delete_user_sessions(pool: &SqlitePool, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Drop every expired session; returns how many were removed
pub async fn purge_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(to_db_timestamp(&Utc::now()))
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
