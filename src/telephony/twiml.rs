//! Voice markup documents
//!
//! Builds the XML the telephony provider executes on each webhook: spoken
//! lines, speech gathering and hang-up.

use std::fmt::Write as _;

/// Content type for markup responses
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// A spoken line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Say {
    pub text: String,
    pub voice: String,
}

impl Say {
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
        }
    }

    fn write_to(&self, out: &mut String) {
        let _ = write!(
            out,
            r#"<Say voice="{}">{}</Say>"#,
            escape(&self.voice),
            escape(&self.text)
        );
    }
}

/// Listen for caller speech and post the result to `action`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gather {
    action: String,
    timeout_secs: u32,
    barge_in: bool,
    prompts: Vec<Say>,
}

impl Gather {
    /// Speech gather posting back to `action`
    pub fn speech(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            timeout_secs: 5,
            barge_in: false,
            prompts: Vec::new(),
        }
    }

    /// Seconds of silence before the gather gives up
    pub fn timeout(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Let the caller talk over the prompt
    pub fn barge_in(mut self, enabled: bool) -> Self {
        self.barge_in = enabled;
        self
    }

    /// Line spoken while listening
    pub fn say(mut self, say: Say) -> Self {
        self.prompts.push(say);
        self
    }

    fn write_to(&self, out: &mut String) {
        let _ = write!(
            out,
            r#"<Gather input="speech" action="{}" method="POST" timeout="{}" bargeIn="{}">"#,
            escape(&self.action),
            self.timeout_secs,
            self.barge_in
        );
        for prompt in &self.prompts {
            prompt.write_to(out);
        }
        out.push_str("</Gather>");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Verb {
    Say(Say),
    Gather(Gather),
    Hangup,
}

/// Markup document builder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, say: Say) -> Self {
        self.verbs.push(Verb::Say(say));
        self
    }

    pub fn gather(mut self, gather: Gather) -> Self {
        self.verbs.push(Verb::Gather(gather));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    /// Render the XML document
    pub fn build(&self) -> String {
        let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => say.write_to(&mut out),
                Verb::Gather(gather) => gather.write_to(&mut out),
                Verb::Hangup => out.push_str("<Hangup/>"),
            }
        }
        out.push_str("</Response>");
        out
    }
}

/// Escape text for XML content and attribute values
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
