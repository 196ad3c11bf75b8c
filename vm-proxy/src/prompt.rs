//! Prompt assembly for the chat-completion gateway
//!
//! Each request type gets a fixed system prompt and a user message carrying
//! the payload. All three ask for the same JSON reply shape.

use serde::{Deserialize, Serialize};
use vm_common::models::{ImageInput, ManualInput, PredictionRequest, VoiceInput};

use crate::error::{ProxyError, ProxyResult};

const REPLY_FORMAT: &str = "Format your response as JSON with keys: predicted_price (number), explanation (string), price_range (object with min and max).";

const MANUAL_SYSTEM_PROMPT: &str = "You are a house price prediction AI for Indian real estate. You predict prices in Indian Rupees based on property features using regression analysis principles. Consider location value, size, amenities, and market trends. Be realistic and provide detailed reasoning.";

const IMAGE_SYSTEM_PROMPT: &str = "You are a house price prediction AI analyzing property images. Assess the ambiance, quality, location type, architectural style, and condition to predict the price in Indian Rupees. Consider visible amenities, finishes, and overall appeal.";

const VOICE_SYSTEM_PROMPT: &str = "You are a house price prediction AI. A user has described a property verbally. Extract relevant details and predict the price in Indian Rupees. Handle multilingual descriptions and informal language. Use regression analysis principles.";

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(text.to_string()),
        }
    }

    pub fn user(content: MessageContent) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// Plain text, or a list of parts for multi-modal input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Build the system + user messages for a request
pub fn build_messages(request: &PredictionRequest) -> ProxyResult<Vec<ChatMessage>> {
    let messages = match request {
        PredictionRequest::Manual(input) => vec![
            ChatMessage::system(MANUAL_SYSTEM_PROMPT),
            ChatMessage::user(MessageContent::Text(manual_prompt(input)?)),
        ],
        PredictionRequest::Image(input) => vec![
            ChatMessage::system(IMAGE_SYSTEM_PROMPT),
            ChatMessage::user(image_content(input)?),
        ],
        PredictionRequest::Voice(input) => vec![
            ChatMessage::system(VOICE_SYSTEM_PROMPT),
            ChatMessage::user(MessageContent::Text(voice_prompt(input)?)),
        ],
    };

    Ok(messages)
}

fn manual_prompt(input: &ManualInput) -> ProxyResult<String> {
    if input.location.trim().is_empty() {
        return Err(ProxyError::InvalidRequest("location is required".to_string()));
    }

    let amenities = match &input.amenities {
        Some(list) if !list.is_empty() => list.join(", "),
        _ => "None specified".to_string(),
    };

    Ok(format!(
        "Predict the house price in Rupees for the following property:\n\
         - Bedrooms: {}\n\
         - Floors: {}\n\
         - Area: {} sq ft\n\
         - Location: {}\n\
         - Amenities: {}\n\
         \n\
         Provide:\n\
         1. Predicted price in Rupees (as a number)\n\
         2. Brief explanation of key price factors\n\
         3. Price range (min-max)\n\
         \n\
         {}",
        input.bedrooms, input.floors, input.area_sqft, input.location, amenities, REPLY_FORMAT
    ))
}

fn image_content(input: &ImageInput) -> ProxyResult<MessageContent> {
    if input.image_url.trim().is_empty() {
        return Err(ProxyError::InvalidRequest("image_url is required".to_string()));
    }

    let text = format!(
        "Analyze this house image and predict its price in Indian Rupees. Provide:\n\
         1. Predicted price in Rupees (as a number)\n\
         2. Analysis of visible features affecting price\n\
         3. Price range (min-max)\n\
         \n\
         {}",
        REPLY_FORMAT
    );

    Ok(MessageContent::Parts(vec![
        ContentPart::Text { text },
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: input.image_url.clone(),
            },
        },
    ]))
}

fn voice_prompt(input: &VoiceInput) -> ProxyResult<String> {
    if input.transcript.trim().is_empty() {
        return Err(ProxyError::InvalidRequest("transcript is required".to_string()));
    }

    Ok(format!(
        "User's voice description: \"{}\"\n\
         \n\
         Based on this description, predict the house price in Indian Rupees. Provide:\n\
         1. Predicted price in Rupees (as a number)\n\
         2. Key features extracted from description\n\
         3. Price range (min-max)\n\
         \n\
         {}",
        input.transcript, REPLY_FORMAT
    ))
}
