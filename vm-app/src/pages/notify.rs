//! Transient page notifications (toasts)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// A dismissible message shown by the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn error(description: &str) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.to_string(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn prediction_complete(price_display: &str) -> Self {
        Self::info(
            "Prediction Complete!",
            &format!("Estimated price: {}", price_display),
        )
    }

    pub fn prediction_deleted() -> Self {
        Self::info("Deleted", "Prediction removed from history")
    }

    pub fn signed_out() -> Self {
        Self::info("Signed out", "You have been successfully signed out.")
    }
}
