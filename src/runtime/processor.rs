//! Executes one call turn

use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::state_machine::{transition, Event, TurnDecision, TurnPlan};
use crate::transcript::{TranscriptStore, Turn};
use std::sync::Arc;

/// Runs the turn state machine against the transcript store and the
/// completion provider
pub struct TurnProcessor {
    store: Arc<TranscriptStore>,
    llm: Arc<dyn LlmService>,
    max_tokens: Option<u32>,
}

impl TurnProcessor {
    pub fn new(store: Arc<TranscriptStore>, llm: Arc<dyn LlmService>) -> Self {
        Self {
            store,
            llm,
            max_tokens: None,
        }
    }

    /// Cap the length of generated replies
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Process one webhook for `call_id`.
    ///
    /// The session lock is held for the whole turn, so concurrent webhooks for
    /// the same call are applied one after another. On a completion failure
    /// the caller's utterance stays in the transcript and no assistant turn is
    /// added.
    pub async fn process(
        &self,
        call_id: &str,
        speech: Option<&str>,
    ) -> Result<TurnDecision, LlmError> {
        let utterance = match transition(Event::from_speech(speech)) {
            TurnPlan::Greet => {
                // First contact opens the session even without speech
                let session = self.store.begin_turn(call_id).await;
                tracing::debug!(
                    call_id = %session.call_id(),
                    turns = session.turn_count(),
                    "No speech, greeting caller"
                );
                return Ok(TurnDecision::Greeting);
            }
            TurnPlan::Terminate { utterance } => {
                let mut session = self.store.begin_turn(call_id).await;
                session.push(Turn::user(utterance));
                tracing::info!(
                    call_id = %session.call_id(),
                    turns = session.turn_count(),
                    "Caller ended the conversation"
                );
                return Ok(TurnDecision::Terminate);
            }
            TurnPlan::Continue { utterance } => utterance,
        };

        let mut session = self.store.begin_turn(call_id).await;
        session.push(Turn::user(utterance));

        let request = LlmRequest::from_turns(session.turns()).with_max_tokens(self.max_tokens);
        let response = self.llm.complete(&request).await?;

        let reply = response.text.trim();
        if reply.is_empty() {
            return Err(LlmError::malformed("Completion returned an empty reply"));
        }

        session.push(Turn::assistant(reply));
        tracing::info!(
            call_id = %session.call_id(),
            turns = session.turn_count(),
            "Assistant replied"
        );

        Ok(TurnDecision::Continue {
            reply_text: reply.to_string(),
        })
    }
}
