//! Manual prediction form

use serde::{de, Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use vm_common::models::{ManualInput, PredictionRequest};

use crate::error::{ApiError, ApiResult};

/// Manual form as submitted by the page
///
/// Numeric fields are optional so an empty or out-of-range input reaches
/// the gate instead of failing deserialization. Inputs may arrive as JSON
/// numbers or as the strings a form field holds (`""` when left empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualForm {
    #[serde(default, deserialize_with = "form_number")]
    pub bedrooms: Option<i64>,
    #[serde(default, deserialize_with = "form_number")]
    pub floors: Option<i64>,
    #[serde(default, deserialize_with = "form_number")]
    pub area_sqft: Option<f64>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl ManualForm {
    /// Check an amenity on if absent, off if present
    ///
    /// Checked amenities keep the order they were checked in.
    pub fn toggle_amenity(&mut self, amenity: &str) {
        if let Some(pos) = self.amenities.iter().position(|a| a == amenity) {
            self.amenities.remove(pos);
        } else {
            self.amenities.push(amenity.to_string());
        }
    }

    /// Gate the form and build the proxy request
    pub fn validate(&self) -> ApiResult<PredictionRequest> {
        let bedrooms = match self.bedrooms.and_then(|n| u32::try_from(n).ok()) {
            Some(n) if n >= 1 => n,
            _ => return Err(missing("Bedrooms")),
        };
        let floors = match self.floors.and_then(|n| u32::try_from(n).ok()) {
            Some(n) if n >= 1 => n,
            _ => return Err(missing("Floors")),
        };
        let area_sqft = match self.area_sqft {
            Some(a) if a.is_finite() && a > 0.0 => a,
            _ => return Err(missing("Area")),
        };
        let location = self.location.trim();
        if location.is_empty() {
            return Err(missing("Location"));
        }

        Ok(PredictionRequest::Manual(ManualInput {
            bedrooms,
            floors,
            area_sqft,
            location: location.to_string(),
            amenities: Some(self.amenities.clone()),
        }))
    }
}

fn missing(field: &str) -> ApiError {
    ApiError::BadRequest(format!("Please fill in {}", field))
}

/// Number, numeric string, blank string or null
fn form_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FormValue<T> {
        Number(T),
        Text(String),
    }

    match Option::<FormValue<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FormValue::Number(n)) => Ok(Some(n)),
        Some(FormValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("not a number: {}", text)))
        }
    }
}
