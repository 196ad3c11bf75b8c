//! Prediction data model shared by the proxy and the application server
//!
//! The proxy speaks `PredictionRequest` on the wire (`{type, data}`) and
//! answers with the gateway's JSON reply. The application server parses that
//! reply into `Prediction` and persists a `NewPrediction` row per success.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// Input modality of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionType {
    /// Property details entered in a form
    Manual,
    /// Uploaded property photo
    Image,
    /// Spoken property description
    Voice,
}

impl PredictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionType::Manual => "manual",
            PredictionType::Image => "image",
            PredictionType::Voice => "voice",
        }
    }
}

impl fmt::Display for PredictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(PredictionType::Manual),
            "image" => Ok(PredictionType::Image),
            "voice" => Ok(PredictionType::Voice),
            other => Err(Error::InvalidInput(format!(
                "Unknown prediction type: {}",
                other
            ))),
        }
    }
}

/// Manual form payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualInput {
    pub bedrooms: u32,
    pub floors: u32,
    pub area_sqft: f64,
    pub location: String,
    /// Selected amenities; absent and empty are treated alike by the prompt
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
}

/// Image payload: a data URI or any URL the gateway can fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInput {
    pub image_url: String,
}

/// Voice payload: the recognised transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceInput {
    pub transcript: String,
}

/// Proxy request body: `{"type": "...", "data": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum PredictionRequest {
    Manual(ManualInput),
    Image(ImageInput),
    Voice(VoiceInput),
}

impl PredictionRequest {
    pub fn prediction_type(&self) -> PredictionType {
        match self {
            PredictionRequest::Manual(_) => PredictionType::Manual,
            PredictionRequest::Image(_) => PredictionType::Image,
            PredictionRequest::Voice(_) => PredictionType::Voice,
        }
    }
}

/// Estimated price bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Gateway reply as seen by the application server
///
/// Only `predicted_price` is required. The other keys are read when they
/// have the requested shape and ignored otherwise; the page always gets the
/// raw reply, so nothing here narrows what it renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_price: f64,
    pub explanation: Option<String>,
    pub price_range: Option<PriceRange>,
}

impl Prediction {
    /// Interpret a raw gateway reply
    pub fn from_value(value: &Value) -> crate::Result<Self> {
        let predicted_price = value
            .get("predicted_price")
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                Error::InvalidInput("Malformed prediction: no numeric predicted_price".to_string())
            })?;

        let explanation = value
            .get("explanation")
            .and_then(Value::as_str)
            .map(str::to_string);

        let price_range = value
            .get("price_range")
            .and_then(|range| PriceRange::deserialize(range).ok());

        Ok(Self {
            predicted_price,
            explanation,
            price_range,
        })
    }
}

/// Persisted prediction row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prediction_type: PredictionType,
    pub predicted_price: f64,
    pub bedrooms: Option<u32>,
    pub floors: Option<u32>,
    pub area_sqft: Option<f64>,
    pub location: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub voice_transcript: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row to insert; `id` and `created_at` are assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub user_id: Uuid,
    pub prediction_type: PredictionType,
    pub predicted_price: f64,
    pub bedrooms: Option<u32>,
    pub floors: Option<u32>,
    pub area_sqft: Option<f64>,
    pub location: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub voice_transcript: Option<String>,
}

impl NewPrediction {
    /// Build the history row for a successful prediction
    ///
    /// Only the fields belonging to the request's modality are populated.
    pub fn from_request(user_id: Uuid, request: &PredictionRequest, predicted_price: f64) -> Self {
        let base = NewPrediction {
            user_id,
            prediction_type: request.prediction_type(),
            predicted_price,
            bedrooms: None,
            floors: None,
            area_sqft: None,
            location: None,
            amenities: None,
            image_url: None,
            voice_transcript: None,
        };

        match request {
            PredictionRequest::Manual(input) => NewPrediction {
                bedrooms: Some(input.bedrooms),
                floors: Some(input.floors),
                area_sqft: Some(input.area_sqft),
                location: Some(input.location.clone()),
                amenities: Some(input.amenities.clone().unwrap_or_default()),
                ..base
            },
            PredictionRequest::Image(input) => NewPrediction {
                image_url: Some(input.image_url.clone()),
                ..base
            },
            PredictionRequest::Voice(input) => NewPrediction {
                voice_transcript: Some(input.transcript.clone()),
                ..base
            },
        }
    }
}
