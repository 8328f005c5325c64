//! HTTP request handlers

use super::types::{
    ErrorResponse, HealthResponse, InitiateCallRequest, InitiateCallResponse, VoiceWebhook,
};
use super::AppState;
use crate::db::StoredTranscript;
use crate::telephony::XML_CONTENT_TYPE;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/version", get(get_version))
        .route("/health", get(health))
        // Outbound calls
        .route("/initiate_call", post(initiate_call))
        // Provider webhooks
        .route("/incoming_call", post(incoming_call))
        .route("/voice_response", post(voice_response))
        // Saved transcripts
        .route("/transcripts/:call_id", get(get_transcript))
        .with_state(state)
}

/// Call markup with the provider's expected content type
struct Twiml(String);

impl IntoResponse for Twiml {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], self.0).into_response()
    }
}

// ============================================================
// Health and version
// ============================================================

async fn index() -> &'static str {
    "Voicebot API is running"
}

async fn get_version() -> &'static str {
    concat!("voicebot ", env!("CARGO_PKG_VERSION"))
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let saved_transcripts = state
        .db
        .transcript_count()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        active_calls: state.store.len().await,
        saved_transcripts,
    }))
}

// ============================================================
// Outbound Calls
// ============================================================

async fn initiate_call(
    State(state): State<AppState>,
    Json(req): Json<InitiateCallRequest>,
) -> Result<Json<InitiateCallResponse>, AppError> {
    let to = req
        .to
        .map(|to| to.trim().to_string())
        .filter(|to| !to.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'to' number".to_string()))?;

    let sid = state
        .calls
        .place_call(&to, &state.callback_url)
        .await
        .map_err(|e| {
            tracing::error!(to = %to, error = %e, "Call initiation failed");
            AppError::BadGateway(e.to_string())
        })?;

    tracing::info!(call_id = %sid, to = %to, "Call initiated");
    Ok(Json(InitiateCallResponse {
        message: "Call initiated".to_string(),
        sid,
    }))
}

// ============================================================
// Provider Webhooks
// ============================================================

async fn incoming_call(State(state): State<AppState>, Form(hook): Form<VoiceWebhook>) -> Twiml {
    tracing::info!(
        call_id = hook.call_sid.as_deref().unwrap_or_default(),
        from = hook.from.as_deref().unwrap_or("unknown"),
        "Incoming call"
    );
    Twiml(state.renderer.welcome())
}

async fn voice_response(
    State(state): State<AppState>,
    Form(hook): Form<VoiceWebhook>,
) -> Result<Twiml, AppError> {
    let call_id = hook
        .call_sid
        .filter(|sid| !sid.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing CallSid".to_string()))?;

    tracing::info!(
        call_id = %call_id,
        from = hook.from.as_deref().unwrap_or("unknown"),
        speech = hook.speech_result.as_deref().unwrap_or_default(),
        "Voice webhook"
    );

    let decision = state
        .processor
        .process(&call_id, hook.speech_result.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(call_id = %call_id, error = %e, kind = ?e.kind, "Completion failed");
            AppError::BadGateway(e.to_string())
        })?;

    tracing::info!(
        call_id = %call_id,
        decision = decision.as_str(),
        reply = decision.reply_text().unwrap_or_default(),
        "Turn decided"
    );

    Ok(Twiml(state.renderer.render(&call_id, &decision).await))
}

// ============================================================
// Saved Transcripts
// ============================================================

async fn get_transcript(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<StoredTranscript>, AppError> {
    state
        .db
        .get_transcript(&call_id)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No transcript for call {call_id}")))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
