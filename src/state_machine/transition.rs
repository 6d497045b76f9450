//! Pure state transition function
//!
//! Given the same state and event this always yields the same result and
//! performs no I/O. Malformed input is an ordinary transition, not an error.

use super::effect::Reply;
use super::state::{IntakeState, Record};
use super::{Effect, Event};

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: IntakeState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: IntakeState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// The outbound message of this transition, if any.
    /// For a completed dialogue this is the confirmation.
    #[cfg(test)]
    pub fn reply(&self) -> Option<&Reply> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Reply(reply) => Some(reply),
            Effect::SaveRecord { confirmation, .. } => Some(confirmation),
        })
    }

    /// The finalized record, if the dialogue completed
    #[cfg(test)]
    pub fn record(&self) -> Option<&Record> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::SaveRecord { record, .. } => Some(record),
            Effect::Reply(_) => None,
        })
    }
}

/// Pure transition function
pub fn transition(state: &IntakeState, event: Event) -> TransitionResult {
    match (state, event) {
        // Start from any state (re)opens the dialogue; a partial name is dropped
        (_, Event::Start) => TransitionResult::new(IntakeState::AwaitingName)
            .with_effect(Effect::Reply(Reply::AskName)),

        // Welcome is a side channel reply, the dialogue is untouched
        (state, Event::Welcome) => {
            TransitionResult::new(state.clone()).with_effect(Effect::Reply(Reply::Welcome))
        }

        // Idle + free text -> ignored
        (IntakeState::Idle, Event::Text(_)) => TransitionResult::new(IntakeState::Idle),

        // AwaitingName + Text -> AwaitingEmail
        (IntakeState::AwaitingName, Event::Text(name)) => {
            TransitionResult::new(IntakeState::AwaitingEmail { name })
                .with_effect(Effect::Reply(Reply::AskEmail))
        }

        // AwaitingEmail + Text -> Idle with record, or retry
        (IntakeState::AwaitingEmail { name }, Event::Text(email)) => {
            match Record::validated(name.clone(), email) {
                Some(record) => {
                    TransitionResult::new(IntakeState::Idle).with_effect(Effect::save_record(record))
                }
                None => TransitionResult::new(state.clone())
                    .with_effect(Effect::Reply(Reply::InvalidEmail)),
            }
        }
    }
}
