//! # ValueMatrix Common Library
//!
//! Shared code for the ValueMatrix services:
//! - Prediction data model and request/response types
//! - Database schema and queries (predictions, users, sessions)
//! - Session tokens and password hashing
//! - Auth event bus and SSE helpers
//! - Configuration loading
//! - Indian-locale price and date formatting

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod format;
pub mod models;
pub mod sse;

pub use error::{Error, Result};
pub use models::{Prediction, PredictionRecord, PredictionRequest, PredictionType};
