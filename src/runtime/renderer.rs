//! Turns a [`TurnDecision`] into call markup and end-of-call side effects

use super::traits::{Notifier, TranscriptSink};
use crate::db::DbError;
use crate::state_machine::TurnDecision;
use crate::telephony::{Gather, Say, VoiceResponse};
use crate::transcript::{TranscriptStore, UnknownSessionError};
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

/// Voice profile for every spoken line
pub const VOICE: &str = "alice";
/// Seconds of caller silence before a gather gives up
pub const GATHER_TIMEOUT_SECS: u32 = 5;

/// Spoken when the provider first connects an inbound call
pub const WELCOME: &str = "Hello! You've reached the AI assistant. How can I help you?";
/// Spoken when a turn arrives without recognized speech
pub const GREETING: &str = "Hello, how can I help you today?";
/// Spoken before hanging up
pub const FAREWELL: &str = "Goodbye! Ending the call now.";

#[derive(Debug, Error)]
enum SnapshotError {
    #[error(transparent)]
    UnknownSession(#[from] UnknownSessionError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Where gathered speech is posted and who hears about finished calls
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub gather_action: String,
    pub notify_to: String,
}

pub struct ResponseRenderer {
    settings: RenderSettings,
    store: Arc<TranscriptStore>,
    sink: Arc<dyn TranscriptSink>,
    notifier: Arc<dyn Notifier>,
}

impl ResponseRenderer {
    pub fn new(
        settings: RenderSettings,
        store: Arc<TranscriptStore>,
        sink: Arc<dyn TranscriptSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            store,
            sink,
            notifier,
        }
    }

    /// Markup for a freshly connected inbound call
    pub fn welcome(&self) -> String {
        self.listen(WELCOME)
    }

    /// Markup for a decision, without side effects
    pub fn markup(&self, decision: &TurnDecision) -> String {
        match decision {
            TurnDecision::Greeting => self.listen(GREETING),
            TurnDecision::Continue { reply_text } => self.listen(reply_text),
            TurnDecision::Terminate => VoiceResponse::new()
                .say(Say::new(FAREWELL, VOICE))
                .hangup()
                .build(),
        }
    }

    /// Markup for a decision. Ending a call first snapshots the transcript,
    /// sends the notification and evicts the session; failures there are
    /// logged and never change the markup.
    pub async fn render(&self, call_id: &str, decision: &TurnDecision) -> String {
        if decision.should_end() {
            self.finish_call(call_id).await;
        }
        self.markup(decision)
    }

    fn listen(&self, text: &str) -> String {
        VoiceResponse::new()
            .gather(
                Gather::speech(&self.settings.gather_action)
                    .timeout(GATHER_TIMEOUT_SECS)
                    .barge_in(true)
                    .say(Say::new(text, VOICE)),
            )
            .build()
    }

    async fn finish_call(&self, call_id: &str) {
        let body = format!("Call {call_id} has ended.");
        let (persisted, notified) = futures::join!(
            self.persist(call_id),
            self.notifier.notify(&self.settings.notify_to, &body)
        );

        report_best_effort(call_id, "transcript snapshot", persisted);
        report_best_effort(call_id, "end-of-call notification", notified);

        self.store.remove(call_id).await;
    }

    async fn persist(&self, call_id: &str) -> Result<(), SnapshotError> {
        let turns = self.store.snapshot(call_id).await?;
        self.sink.persist(call_id, &turns).await?;
        Ok(())
    }
}

/// Log the outcome of a side effect that must not affect the response
fn report_best_effort<E: Display>(call_id: &str, effect: &str, result: Result<(), E>) {
    match result {
        Ok(()) => tracing::info!(call_id = %call_id, effect, "Side effect completed"),
        Err(e) => tracing::warn!(call_id = %call_id, effect, error = %e, "Side effect failed"),
    }
}
