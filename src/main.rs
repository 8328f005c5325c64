//! Voicebot - AI voice assistant for phone calls
//!
//! Answers telephony webhooks, keeps a transcript per call, asks a chat
//! completion model for each reply, and snapshots the transcript when the
//! caller says goodbye.

mod api;
mod config;
mod db;
mod llm;
mod runtime;
mod state_machine;
mod telephony;
mod transcript;

use api::{create_router, AppState};
use config::Config;
use db::Database;
use runtime::{RenderSettings, ResponseRenderer, TurnProcessor};
use std::net::SocketAddr;
use std::sync::Arc;
use telephony::TwilioClient;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transcript::TranscriptStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voicebot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let llm = llm::build_service(&config.llm)?;
    tracing::info!(
        model = %llm.model_id(),
        gateway = config.llm.gateway.is_some(),
        "Completion provider ready"
    );

    let twilio = Arc::new(TwilioClient::new(config.twilio.clone())?);
    let store = Arc::new(TranscriptStore::new());

    let processor =
        TurnProcessor::new(store.clone(), llm).with_max_tokens(config.llm.max_tokens);
    let renderer = ResponseRenderer::new(
        RenderSettings {
            gather_action: config.voice_callback_url(),
            notify_to: config.notify_number.clone(),
        },
        store.clone(),
        Arc::new(db.clone()),
        twilio.clone(),
    );

    let state = AppState::new(
        store,
        db,
        processor,
        renderer,
        twilio,
        config.voice_callback_url(),
    );

    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Voicebot server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
