//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the call flow with mock implementations.

use crate::db::{Database, DbError};
use crate::telephony::{TwilioClient, TwilioError};
use crate::transcript::Turn;
use async_trait::async_trait;

/// Places outbound calls
#[async_trait]
pub trait CallInitiator: Send + Sync {
    /// Dial `to`; the provider fetches call markup from `callback_url`.
    /// Returns the call identifier.
    async fn place_call(&self, to: &str, callback_url: &str) -> Result<String, TwilioError>;
}

/// Sends end-of-call notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, to: &str, body: &str) -> Result<(), TwilioError>;
}

/// Durable storage for finished transcripts
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Upsert the full transcript for `call_id`
    async fn persist(&self, call_id: &str, turns: &[Turn]) -> Result<(), DbError>;
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl CallInitiator for TwilioClient {
    async fn place_call(&self, to: &str, callback_url: &str) -> Result<String, TwilioError> {
        self.create_call(to, callback_url).await
    }
}

#[async_trait]
impl Notifier for TwilioClient {
    async fn notify(&self, to: &str, body: &str) -> Result<(), TwilioError> {
        let sid = self.send_sms(to, body).await?;
        tracing::debug!(message_sid = %sid, "Notification sent");
        Ok(())
    }
}

#[async_trait]
impl TranscriptSink for Database {
    async fn persist(&self, call_id: &str, turns: &[Turn]) -> Result<(), DbError> {
        self.save_transcript(call_id, turns)
    }
}
