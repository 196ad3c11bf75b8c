//! HTTP API handlers for vm-app

pub mod auth;
pub mod health;
pub mod history;
pub mod nav;
pub mod predict;
pub mod ui;

pub use auth::auth_routes;
pub use health::health_routes;
pub use history::{delete_history_entry, list_history};
pub use nav::get_navigation;
pub use predict::{get_page_state, predict_image, predict_manual, predict_voice};
pub use ui::ui_routes;
