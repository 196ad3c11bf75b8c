//! Prediction history endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;
use vm_common::db::predictions;
use vm_common::format::{excerpt, format_created_at, format_inr};
use vm_common::models::PredictionRecord;

use crate::error::{ApiError, ApiResult};
use crate::pages::Notification;
use crate::session::CurrentUser;
use crate::AppState;

/// Characters of a voice transcript shown in the history list
const DESCRIPTION_EXCERPT_CHARS: usize = 100;

/// One history card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub record: PredictionRecord,
    pub price_display: String,
    pub created_display: String,
    pub summary: Vec<String>,
}

impl HistoryEntry {
    pub fn from_record(record: PredictionRecord) -> Self {
        Self {
            price_display: format_inr(record.predicted_price),
            created_display: format_created_at(&record.created_at),
            summary: summary_lines(&record),
            record,
        }
    }
}

fn summary_lines(record: &PredictionRecord) -> Vec<String> {
    let mut lines = Vec::new();

    if let (Some(bedrooms), Some(floors), Some(area)) =
        (record.bedrooms, record.floors, record.area_sqft)
    {
        lines.push(format!(
            "Bedrooms: {}, Floors: {}, Area: {} sq ft",
            bedrooms, floors, area
        ));
    }
    if let Some(location) = &record.location {
        lines.push(format!("Location: {}", location));
    }
    if let Some(transcript) = &record.voice_transcript {
        lines.push(format!(
            "Description: {}",
            excerpt(transcript, DESCRIPTION_EXCERPT_CHARS)
        ));
    }

    lines
}

/// The history list as a page holds it
///
/// Deletions are applied locally as soon as the store confirms them,
/// without reloading the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistoryView {
    entries: Vec<HistoryEntry>,
}

impl HistoryView {
    pub fn from_records(records: Vec<PredictionRecord>) -> Self {
        Self {
            entries: records.into_iter().map(HistoryEntry::from_record).collect(),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the entry with `id`; returns whether one was removed
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.record.id != id);
        self.entries.len() != before
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub notification: Notification,
}

/// GET /api/history
///
/// All of the caller's predictions, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<HistoryView>> {
    let records = predictions::list_predictions(&state.db, current.user.id)
        .await
        .map_err(|e| {
            error!(user_id = %current.user.id, error = %e, "Error fetching history");
            ApiError::Internal("Failed to load history".to_string())
        })?;

    Ok(Json(HistoryView::from_records(records)))
}

/// DELETE /api/history/:id
pub async fn delete_history_entry(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = predictions::delete_prediction(&state.db, current.user.id, id)
        .await
        .map_err(|e| {
            error!(user_id = %current.user.id, prediction_id = %id, error = %e, "Error deleting prediction");
            ApiError::Internal("Failed to delete prediction".to_string())
        })?;

    if !deleted {
        return Err(ApiError::NotFound("Failed to delete prediction".to_string()));
    }

    info!(user_id = %current.user.id, prediction_id = %id, "Prediction deleted");

    Ok(Json(DeleteResponse {
        id,
        notification: Notification::prediction_deleted(),
    }))
}
