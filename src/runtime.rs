//! Runtime for live calls
//!
//! Applies each webhook turn to the transcript store and the completion
//! provider, then renders the outcome for the telephony provider.

mod processor;
mod renderer;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use processor::TurnProcessor;
pub use renderer::{RenderSettings, ResponseRenderer};
pub use traits::*;
