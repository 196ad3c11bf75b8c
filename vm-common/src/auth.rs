//! Session tokens and password hashing
//!
//! Pure functions only; persistence lives in `db::users` and `db::sessions`.
//!
//! Tokens are 32 random bytes rendered as hex. Only their SHA-256 digest is
//! stored, so a copy of the database cannot be replayed as a session.
//! Passwords are stored as an iterated, salted SHA-256 digest.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{Error, Result};

const TOKEN_BYTES: usize = 32;
const SALT_BYTES: usize = 16;
const PASSWORD_HASH_ROUNDS: u32 = 10_000;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Signed-up account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Issued session handed back to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    pub fn new(access_token: String, expires_at: DateTime<Utc>, user: User) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_at,
            user,
        }
    }
}

/// Generate a fresh opaque session token
pub fn generate_token() -> String {
    random_hex(TOKEN_BYTES)
}

/// Generate a password salt
pub fn generate_salt() -> String {
    random_hex(SALT_BYTES)
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Digest under which a token is stored
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Salted, iterated SHA-256 of a password (64 hex chars)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut digest = {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hasher.finalize()
    };

    for _ in 1..PASSWORD_HASH_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt.as_bytes());
        digest = hasher.finalize();
    }

    to_hex(&digest)
}

/// Check a password against its stored digest
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    constant_time_eq(hash_password(password, salt).as_bytes(), expected_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Lower-case and trim an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign-up credential rules
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    let email = normalize_email(email);
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !well_formed {
        return Err(Error::InvalidInput(format!("Invalid email address: {}", email)));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidInput(format!(
            "Password should be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    Ok(())
}
