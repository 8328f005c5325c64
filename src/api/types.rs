//! API request and response types

use serde::{Deserialize, Serialize};

/// Request to place an outbound call
#[derive(Debug, Deserialize)]
pub struct InitiateCallRequest {
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitiateCallResponse {
    pub message: String,
    pub sid: String,
}

/// Form fields the telephony provider posts to the voice webhooks.
/// Fields not listed here are ignored.
#[derive(Debug, Deserialize)]
pub struct VoiceWebhook {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_calls: usize,
    pub saved_transcripts: i64,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
