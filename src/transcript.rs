//! Per-call conversation transcripts
//!
//! Every call gets its own ordered turn list, seeded with the assistant
//! instructions on first contact. The turn list is sent verbatim to the
//! completion provider, so insertion order is significant.

mod store;

pub use store::{TranscriptStore, UnknownSessionError};

use serde::{Deserialize, Serialize};

/// Instruction turn that opens every call transcript
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful AI voice assistant. \
Always reply in short and concise sentences. Avoid long answers.";

/// Speaker of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a call transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
