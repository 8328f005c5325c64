//! Telephony provider integration
//!
//! Markup documents returned from webhooks and the REST client used for
//! outbound calls and SMS.

mod twilio;
mod twiml;

pub use twilio::{TwilioClient, TwilioConfig, TwilioError};
pub use twiml::{Gather, Say, VoiceResponse, XML_CONTENT_TYPE};
