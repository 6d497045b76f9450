//! Intake dialogue state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Reply};
pub use event::{Event, Triggers};
pub use state::{ChatId, IntakeState, Record};
pub use transition::transition;
