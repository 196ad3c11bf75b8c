//! Session-change notifications
//!
//! Pages subscribe to auth state changes (sign-in, sign-out, token refresh)
//! so they can redirect to the sign-in page the moment a session ends.
//! Events fan out over a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Auth state change for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthEvent {
    SignedIn {
        user_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    SignedOut {
        user_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    TokenRefreshed {
        user_id: Uuid,
        expires_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
}

impl AuthEvent {
    pub fn signed_in(user_id: Uuid) -> Self {
        AuthEvent::SignedIn {
            user_id,
            timestamp: Utc::now(),
        }
    }

    pub fn signed_out(user_id: Uuid) -> Self {
        AuthEvent::SignedOut {
            user_id,
            timestamp: Utc::now(),
        }
    }

    pub fn token_refreshed(user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        AuthEvent::TokenRefreshed {
            user_id,
            expires_at,
            timestamp: Utc::now(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            AuthEvent::SignedIn { user_id, .. }
            | AuthEvent::SignedOut { user_id, .. }
            | AuthEvent::TokenRefreshed { user_id, .. } => *user_id,
        }
    }

    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn { .. } => "SignedIn",
            AuthEvent::SignedOut { .. } => "SignedOut",
            AuthEvent::TokenRefreshed { .. } => "TokenRefreshed",
        }
    }
}

/// Broadcast bus for auth events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AuthEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per lagging subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Emit an event; returns the number of subscribers reached
    ///
    /// Having no subscribers is normal (no page is listening) and yields 0.
    pub fn emit(&self, event: AuthEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(event_type = event.event_type(), "No subscribers for auth event");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        let user = Uuid::new_v4();

        assert_eq!(bus.emit(AuthEvent::signed_in(user)), 1);
        bus.emit(AuthEvent::signed_out(user));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.event_type(), "SignedIn");
        assert_eq!(second.event_type(), "SignedOut");
        assert_eq!(second.user_id(), user);
    }

    #[test]
    fn test_emit_without_subscribers_is_not_an_error() {
        let bus = EventBus::new(4);
        assert_eq!(bus.emit(AuthEvent::signed_out(Uuid::new_v4())), 0);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AuthEvent::signed_in(Uuid::nil());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SignedIn");
        assert_eq!(json["user_id"], Uuid::nil().to_string());
    }
}
