//! Call turn state machine
//!
//! Each webhook is one turn: an [`Event`] is classified by the pure
//! [`transition`] into a [`TurnPlan`], and the runtime turns the executed plan
//! into a [`TurnDecision`] for the renderer.

mod decision;
mod event;
mod transition;


pub use decision::TurnDecision;
pub use event::Event;
pub use transition::{transition, TurnPlan};
