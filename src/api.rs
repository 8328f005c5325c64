//! HTTP API for the voicebot
//!
//! Telephony webhooks plus the outbound call trigger and health checks.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::db::Database;
use crate::runtime::{CallInitiator, ResponseRenderer, TurnProcessor};
use crate::transcript::TranscriptStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<TurnProcessor>,
    pub renderer: Arc<ResponseRenderer>,
    pub calls: Arc<dyn CallInitiator>,
    pub store: Arc<TranscriptStore>,
    pub db: Database,
    /// Where the provider fetches markup for outbound calls
    pub callback_url: String,
}

impl AppState {
    pub fn new(
        store: Arc<TranscriptStore>,
        db: Database,
        processor: TurnProcessor,
        renderer: ResponseRenderer,
        calls: Arc<dyn CallInitiator>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            processor: Arc::new(processor),
            renderer: Arc::new(renderer),
            calls,
            store,
            db,
            callback_url: callback_url.into(),
        }
    }
}
