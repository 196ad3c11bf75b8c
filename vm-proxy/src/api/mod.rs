//! HTTP API handlers for vm-proxy

pub mod health;
pub mod predict;

pub use health::health_routes;
pub use predict::predict_price;
