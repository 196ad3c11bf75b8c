//! Predictive page logic
//!
//! Each page (manual, image, voice) walks the same cycle:
//! `idle -> submitting -> (success | failure) -> idle`. Success leaves the
//! result rendered while the page is ready again. A user can have at
//! most one submission pending per page; a second one is rejected while the
//! first is still `submitting`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;
use vm_common::models::PredictionType;

pub mod flow;
pub mod image;
pub mod manual;
pub mod notify;
pub mod voice;

pub use flow::{run_prediction, PredictionOutcome};
pub use notify::{Notification, NotificationVariant};

/// The three predictive pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Manual,
    Image,
    Voice,
}

impl PageKind {
    pub fn prediction_type(&self) -> PredictionType {
        match self {
            PageKind::Manual => PredictionType::Manual,
            PageKind::Image => PredictionType::Image,
            PageKind::Voice => PredictionType::Voice,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prediction_type().as_str())
    }
}

/// Where a page is in its submit cycle
///
/// `Success` is the idle page with a result on screen: it accepts the next
/// submission exactly like `Idle`, and a later failure clears it to `Idle`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PageState {
    Idle,
    Submitting,
    /// Last submission succeeded; the result stays rendered until the next one
    Success { price_display: String },
}

type PageKey = (Uuid, PageKind);

/// Per-user, per-page submission state
#[derive(Clone, Default)]
pub struct SubmissionTracker {
    states: Arc<Mutex<HashMap<PageKey, PageState>>>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PageKey, PageState>> {
        // A panic while holding the lock leaves the map usable
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current state of a page for a user
    pub fn state(&self, user_id: Uuid, page: PageKind) -> PageState {
        self.lock()
            .get(&(user_id, page))
            .cloned()
            .unwrap_or(PageState::Idle)
    }

    /// Move a page to `submitting`
    ///
    /// Returns `None` when a submission is already pending. The returned
    /// guard puts the page back to `idle` when dropped unless
    /// [`Submission::succeed`] was called.
    pub fn try_begin(&self, user_id: Uuid, page: PageKind) -> Option<Submission> {
        let mut states = self.lock();
        let key = (user_id, page);

        if matches!(states.get(&key), Some(PageState::Submitting)) {
            return None;
        }

        states.insert(key, PageState::Submitting);
        Some(Submission {
            tracker: self.clone(),
            key,
            finished: false,
        })
    }
}

/// A pending submission
pub struct Submission {
    tracker: SubmissionTracker,
    key: PageKey,
    finished: bool,
}

impl Submission {
    pub fn succeed(mut self, price_display: &str) {
        self.tracker.lock().insert(
            self.key,
            PageState::Success {
                price_display: price_display.to_string(),
            },
        );
        self.finished = true;
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        if !self.finished {
            self.tracker.lock().insert(self.key, PageState::Idle);
        }
    }
}
