//! Outcome of a processed call turn

/// What the call should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnDecision {
    /// Nothing was said yet; greet and listen
    Greeting,
    /// Speak the assistant reply and keep listening
    Continue { reply_text: String },
    /// The caller said goodbye; end the call
    Terminate,
}

impl TurnDecision {
    pub fn should_end(&self) -> bool {
        matches!(self, TurnDecision::Terminate)
    }

    /// Assistant reply, present only for [`TurnDecision::Continue`]
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            TurnDecision::Continue { reply_text } => Some(reply_text),
            TurnDecision::Greeting | TurnDecision::Terminate => None,
        }
    }

    /// Short label for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnDecision::Greeting => "greeting",
            TurnDecision::Continue { .. } => "continue",
            TurnDecision::Terminate => "terminate",
        }
    }
}
