//! Server-Sent Events (SSE) utilities

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::EventBus;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Stream one user's auth events to a page
///
/// Sends a `ConnectionStatus: connected` event first, then every
/// `AuthEvent` for `user_id` as it happens. The stream ends after the user
/// signs out, since the page is expected to leave for the sign-in page.
pub fn auth_event_stream(
    bus: &EventBus,
    user_id: Uuid,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(user_id = %user_id, "New SSE client connected to auth events");

    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) if event.user_id() == user_id => {
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            warn!("Failed to serialize auth event: {}", e);
                            continue;
                        }
                    };
                    let signed_out = matches!(event, crate::events::AuthEvent::SignedOut { .. });
                    debug!(user_id = %user_id, event_type = event.event_type(), "SSE: sending auth event");
                    yield Ok(Event::default().event(event.event_type()).data(data));
                    if signed_out {
                        break;
                    }
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "SSE: auth event subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            }
        }

        info!(user_id = %user_id, "SSE: auth event stream ended");
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
