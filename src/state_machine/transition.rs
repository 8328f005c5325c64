//! Pure turn classification
//!
//! Decides which of the three turn states applies without touching the
//! transcript or any provider. The runtime carries out the plan.

use super::Event;

/// Phrase that ends the call when it appears anywhere in an utterance,
/// compared case-insensitively
pub const END_OF_CALL_PHRASE: &str = "goodbye";

/// Work the runtime must do for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPlan {
    /// Speak the greeting; no transcript change, no completion call
    Greet,
    /// Record the utterance, ask the completion provider, record the reply
    Continue { utterance: String },
    /// Record the utterance and end the call
    Terminate { utterance: String },
}

impl TurnPlan {
    /// Number of transcript turns the plan appends when it succeeds
    #[allow(dead_code)] // Used in tests
    pub fn appended_turns(&self) -> usize {
        match self {
            TurnPlan::Greet => 0,
            TurnPlan::Continue { .. } => 2,
            TurnPlan::Terminate { .. } => 1,
        }
    }
}

/// Whether the caller asked to end the call
pub fn is_end_of_call(utterance: &str) -> bool {
    utterance.to_lowercase().contains(END_OF_CALL_PHRASE)
}

/// Pure transition function
pub fn transition(event: Event) -> TurnPlan {
    match event {
        Event::Silence => TurnPlan::Greet,
        Event::Utterance { text } if is_end_of_call(&text) => TurnPlan::Terminate { utterance: text },
        Event::Utterance { text } => TurnPlan::Continue { utterance: text },
    }
}
