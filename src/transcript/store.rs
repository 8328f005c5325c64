//! In-memory registry of live call sessions

use super::{Role, Turn, SYSTEM_INSTRUCTION};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Raised when a turn is appended to, or read from, a call that was never
/// opened with [`TranscriptStore::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No session for call {0}")]
pub struct UnknownSessionError(pub String);

/// Conversation state for a single call
#[derive(Debug)]
pub struct CallSession {
    call_id: String,
    turns: Vec<Turn>,
}

impl CallSession {
    fn new(call_id: &str) -> Self {
        Self {
            call_id: call_id.to_string(),
            turns: vec![Turn::system(SYSTEM_INSTRUCTION)],
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Turns in insertion order; the first is always the system instruction
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}

/// Exclusive hold on one call's session for the length of a turn.
/// Other webhooks for the same call wait until it is dropped.
pub struct SessionTurn {
    session: OwnedMutexGuard<CallSession>,
}

impl SessionTurn {
    pub fn call_id(&self) -> &str {
        self.session.call_id()
    }

    pub fn turns(&self) -> &[Turn] {
        self.session.turns()
    }

    pub fn turn_count(&self) -> usize {
        self.session.turn_count()
    }

    pub fn push(&mut self, turn: Turn) {
        self.session.push(turn);
    }
}

/// Shared handle to one session. Holding the lock serializes turns for
/// that call without blocking any other call.
pub type SessionHandle = Arc<Mutex<CallSession>>;

/// Map of call identifier to session, with lazy creation
#[derive(Default)]
pub struct TranscriptStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `call_id`, creating it on first contact
    pub async fn get_or_create(&self, call_id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(call_id) {
            return handle.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(call_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(call_id = %call_id, "Opened call session");
                Arc::new(Mutex::new(CallSession::new(call_id)))
            })
            .clone()
    }

    /// Lock the session for `call_id`, creating it on first contact
    pub async fn begin_turn(&self, call_id: &str) -> SessionTurn {
        let handle = self.get_or_create(call_id).await;
        SessionTurn {
            session: handle.lock_owned().await,
        }
    }

    pub async fn get(&self, call_id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(call_id).cloned()
    }

    #[allow(dead_code)] // Used in tests
    pub async fn append(
        &self,
        call_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<(), UnknownSessionError> {
        let handle = self
            .get(call_id)
            .await
            .ok_or_else(|| UnknownSessionError(call_id.to_string()))?;
        handle.lock().await.push(Turn::new(role, content));
        Ok(())
    }

    /// Copy of the full transcript for persistence
    pub async fn snapshot(&self, call_id: &str) -> Result<Vec<Turn>, UnknownSessionError> {
        let handle = self
            .get(call_id)
            .await
            .ok_or_else(|| UnknownSessionError(call_id.to_string()))?;
        let session = handle.lock().await;
        Ok(session.turns().to_vec())
    }

    /// Drop a finished call. Returns whether a session was present.
    pub async fn remove(&self, call_id: &str) -> bool {
        self.sessions.write().await.remove(call_id).is_some()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[allow(dead_code)] // Used in tests
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
