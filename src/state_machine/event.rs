//! Inbound events for a call turn

/// What the caller did since the last webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// No speech was recognized (first contact, or the gather timed out)
    Silence,
    /// Recognized speech, trimmed and non-empty
    Utterance { text: String },
}

impl Event {
    /// Classify the provider's speech field; blank speech counts as silence
    pub fn from_speech(speech: Option<&str>) -> Self {
        match speech.map(str::trim) {
            Some(text) if !text.is_empty() => Event::Utterance {
                text: text.to_string(),
            },
            _ => Event::Silence,
        }
    }
}
