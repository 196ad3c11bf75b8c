//! Error type shared by the ValueMatrix crates
//!
//! `InvalidInput`, `Unauthorized` and `NotFound` carry text shown to the
//! person using the page. The other variants are for the operator log.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unreadable or not valid TOML
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored column no longer decodes into its model type
    #[error("Corrupt stored value in {column}: {reason}")]
    CorruptRow { column: String, reason: String },

    /// Amenity list could not be encoded for storage
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    /// Rejected form input or sign-up credentials
    #[error("{0}")]
    InvalidInput(String),

    /// Bad credentials or no live session
    #[error("{0}")]
    Unauthorized(String),
}

impl Error {
    pub(crate) fn corrupt(column: &str, reason: impl std::fmt::Display) -> Self {
        Error::CorruptRow {
            column: column.to_string(),
            reason: reason.to_string(),
        }
    }
}
