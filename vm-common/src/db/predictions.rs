//! Prediction history operations
//!
//! Rows are insert-only; there is no update path. Every read and delete is
//! scoped to the owning user.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{from_db_timestamp, parse_uuid, to_db_timestamp};
use crate::models::{NewPrediction, PredictionRecord, PredictionType};
use crate::{Error, Result};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, prediction_type, predicted_price,
           bedrooms, floors, area_sqft, location, amenities,
           image_url, voice_transcript, created_at
    FROM predictions
"#;

/// Insert a prediction; the store assigns `id` and `created_at`
pub async fn insert_prediction(pool: &SqlitePool, new: &NewPrediction) -> Result<PredictionRecord> {
    let record = PredictionRecord {
        id: Uuid::new_v4(),
        user_id: new.user_id,
        prediction_type: new.prediction_type,
        predicted_price: new.predicted_price,
        bedrooms: new.bedrooms,
        floors: new.floors,
        area_sqft: new.area_sqft,
        location: new.location.clone(),
        amenities: new.amenities.clone(),
        image_url: new.image_url.clone(),
        voice_transcript: new.voice_transcript.clone(),
        created_at: Utc::now(),
    };

    let amenities = record
        .amenities
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO predictions (
            id, user_id, prediction_type, predicted_price,
            bedrooms, floors, area_sqft, location, amenities,
            image_url, voice_transcript, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.user_id.to_string())
    .bind(record.prediction_type.as_str())
    .bind(record.predicted_price)
    .bind(record.bedrooms.map(i64::from))
    .bind(record.floors.map(i64::from))
    .bind(record.area_sqft)
    .bind(&record.location)
    .bind(&amenities)
    .bind(&record.image_url)
    .bind(&record.voice_transcript)
    .bind(to_db_timestamp(&record.created_at))
    .execute(pool)
    .await?;

    tracing::debug!(
        prediction_id = %record.id,
        user_id = %record.user_id,
        prediction_type = %record.prediction_type,
        "Prediction saved"
    );

    Ok(record)
}

/// All predictions owned by `user_id`, newest first
pub async fn list_predictions(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<PredictionRecord>> {
    let sql = format!(
        "{} WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        SELECT_COLUMNS
    );

    let rows = sqlx::query(&sql)
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(record_from_row).collect()
}

/// One prediction, if it exists and belongs to `user_id`
pub async fn get_prediction(
    pool: &SqlitePool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<PredictionRecord>> {
    let sql = format!("{} WHERE id = ? AND user_id = ?", SELECT_COLUMNS);

    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Delete one prediction owned by `user_id`
///
/// Returns `false` when no such row exists for that owner; another user's
/// row is indistinguishable from a missing one.
pub async fn delete_prediction(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM predictions WHERE id = ? AND user_id = ?")
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

fn record_from_row(row: &SqliteRow) -> Result<PredictionRecord> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let prediction_type: String = row.try_get("prediction_type")?;
    let amenities: Option<String> = row.try_get("amenities")?;
    let created_at: String = row.try_get("created_at")?;

    let amenities = amenities
        .map(|json| serde_json::from_str::<Vec<String>>(&json))
        .transpose()
        .map_err(|e| Error::corrupt("predictions.amenities", e))?;

    Ok(PredictionRecord {
        id: parse_uuid("id", &id)?,
        user_id: parse_uuid("user_id", &user_id)?,
        prediction_type: prediction_type.parse::<PredictionType>()?,
        predicted_price: row.try_get("predicted_price")?,
        bedrooms: row.try_get::<Option<i64>, _>("bedrooms")?.map(|v| v as u32),
        floors: row.try_get::<Option<i64>, _>("floors")?.map(|v| v as u32),
        area_sqft: row.try_get("area_sqft")?,
        location: row.try_get("location")?,
        amenities,
        image_url: row.try_get("image_url")?,
        voice_transcript: row.try_get("voice_transcript")?,
        created_at: from_db_timestamp("created_at", &created_at)?,
    })
}
