//! Account storage for the auth provider

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{from_db_timestamp, parse_uuid, to_db_timestamp};
use crate::auth::{self, User};
use crate::{Error, Result};

/// Register a new account
pub async fn create_user(pool: &SqlitePool, email: &str, password: &str) -> Result<User> {
    auth::validate_credentials(email, password)?;

    let user = User {
        id: Uuid::new_v4(),
        email: auth::normalize_email(email),
        created_at: Utc::now(),
    };
    let salt = auth::generate_salt();
    let password_hash = auth::hash_password(password, &salt);

    let result = sqlx::query(
        "INSERT INTO users (id, email, password_hash, password_salt, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user.id.to_string())
    .bind(&user.email)
    .bind(&password_hash)
    .bind(&salt)
    .bind(to_db_timestamp(&user.created_at))
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            tracing::info!(user_id = %user.id, "User registered");
            Ok(user)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(Error::InvalidInput("User already registered".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Check email and password, returning the account on success
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> Result<User> {
    let row = sqlx::query(
        "SELECT id, email, password_hash, password_salt, created_at FROM users WHERE email = ?",
    )
    .bind(auth::normalize_email(email))
    .fetch_optional(pool)
    .await?;

    let invalid = || Error::Unauthorized("Invalid login credentials".to_string());
    let row = row.ok_or_else(invalid)?;

    let password_hash: String = row.try_get("password_hash")?;
    let salt: String = row.try_get("password_salt")?;
    if !auth::verify_password(password, &salt, &password_hash) {
        return Err(invalid());
    }

    user_from_parts(
        row.try_get("id")?,
        row.try_get("email")?,
        row.try_get("created_at")?,
    )
}

/// Look up an account by id
pub async fn get_user(pool: &SqlitePool, id: Uuid) -> Result<Option<User>> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, email, created_at FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

    row.map(|(id, email, created_at)| user_from_parts(id, email, created_at))
        .transpose()
}

pub(crate) fn user_from_parts(id: String, email: String, created_at: String) -> Result<User> {
    Ok(User {
        id: parse_uuid("users.id", &id)?,
        email,
        created_at: from_db_timestamp("users.created_at", &created_at)?,
    })
}
