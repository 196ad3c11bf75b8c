//! Voice description handling
//!
//! Speech recognition runs in the browser; the page posts either the final
//! transcript or the raw recognition segments.

use serde::{Deserialize, Serialize};
use vm_common::models::{PredictionRequest, VoiceInput};

use crate::error::{ApiError, ApiResult};

pub const NO_RECORDING_MESSAGE: &str = "Please record a description first";

/// One speech-recognition result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
}

/// Accumulates final segments the way the recorder does
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuilder {
    text: String,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interim segments are ignored; final ones are appended with a trailing space
    pub fn push(&mut self, segment: &TranscriptSegment) {
        if segment.is_final {
            self.text.push_str(&segment.transcript);
            self.text.push(' ');
        }
    }

    pub fn transcript(&self) -> String {
        self.text.trim().to_string()
    }
}

/// Voice form as submitted by the page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceForm {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub segments: Option<Vec<TranscriptSegment>>,
}

impl VoiceForm {
    /// Trimmed transcript; an explicit `transcript` takes precedence over segments
    pub fn transcript(&self) -> String {
        if let Some(text) = &self.transcript {
            return text.trim().to_string();
        }

        let mut builder = TranscriptBuilder::new();
        for segment in self.segments.iter().flatten() {
            builder.push(segment);
        }
        builder.transcript()
    }

    /// Gate the recording and build the proxy request
    pub fn validate(&self) -> ApiResult<PredictionRequest> {
        let transcript = self.transcript();
        if transcript.is_empty() {
            return Err(ApiError::BadRequest(NO_RECORDING_MESSAGE.to_string()));
        }

        Ok(PredictionRequest::Voice(VoiceInput { transcript }))
    }
}
