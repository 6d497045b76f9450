//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::Step;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z ]{1,30}"
}

fn arb_state() -> impl Strategy<Value = IntakeState> {
    prop_oneof![
        Just(IntakeState::Idle),
        Just(IntakeState::AwaitingName),
        arb_name().prop_map(|name| IntakeState::AwaitingEmail { name }),
    ]
}

fn arb_invalid_email() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .#!-]{0,40}"
}

fn arb_valid_email() -> impl Strategy<Value = String> {
    ("[a-z0-9.]{1,12}", "[a-z]{1,10}\\.[a-z]{2,4}").prop_map(|(user, host)| format!("{user}@{host}"))
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Start),
        Just(Event::Welcome),
        arb_invalid_email().prop_map(Event::Text),
        arb_valid_email().prop_map(Event::Text),
    ]
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    // Invariant 1: Start from any state yields AwaitingName with no collected data
    #[test]
    fn prop_start_always_resets(state in arb_state()) {
        let result = transition(&state, Event::Start);
        prop_assert_eq!(&result.new_state, &IntakeState::AwaitingName);
        prop_assert_eq!(result.new_state.name(), None);
        prop_assert_eq!(result.reply(), Some(&Reply::AskName));
        prop_assert!(result.record().is_none());
    }

    // Invariant 2: Rejected emails never mutate the name or advance the step
    #[test]
    fn prop_invalid_email_is_idempotent(
        name in arb_name(),
        attempts in proptest::collection::vec(arb_invalid_email(), 1..10)
    ) {
        let initial = IntakeState::AwaitingEmail { name };
        let mut state = initial.clone();
        for attempt in attempts {
            let result = transition(&state, Event::Text(attempt));
            prop_assert_eq!(&result.new_state, &initial);
            prop_assert_eq!(result.reply(), Some(&Reply::InvalidEmail));
            prop_assert!(result.record().is_none());
            state = result.new_state;
        }
    }

    // Invariant 3: Free text without a session produces nothing
    #[test]
    fn prop_idle_text_is_silent(text in "[^/]{0,40}") {
        let result = transition(&IntakeState::Idle, Event::Text(text));
        prop_assert_eq!(result.new_state, IntakeState::Idle);
        prop_assert!(result.effects.is_empty());
    }

    // Invariant 4: A record is emitted exactly when the dialogue returns to Idle
    // from AwaitingEmail, and it always carries the collected name
    #[test]
    fn prop_record_only_on_completion(state in arb_state(), event in arb_event()) {
        let result = transition(&state, event);
        match result.record() {
            Some(record) => {
                prop_assert_eq!(Some(record.name.as_str()), state.name());
                prop_assert!(record.email.contains('@'));
                prop_assert!(!result.new_state.is_active());
            }
            None => {
                prop_assert!(
                    !(matches!(state, IntakeState::AwaitingEmail { .. })
                        && result.new_state == IntakeState::Idle),
                    "Left AwaitingEmail for Idle without a record"
                );
            }
        }
    }

    // Invariant 5: At most one outbound message per transition
    #[test]
    fn prop_at_most_one_effect(state in arb_state(), event in arb_event()) {
        let result = transition(&state, event);
        prop_assert!(result.effects.len() <= 1);
    }

    // Invariant 6: A name is present whenever the new state awaits an email
    #[test]
    fn prop_awaiting_email_has_name(
        state in arb_state(),
        events in proptest::collection::vec(arb_event(), 0..12)
    ) {
        let mut state = state;
        for event in events {
            state = transition(&state, event).new_state;
            if state.step() == Step::AwaitingEmail {
                prop_assert!(state.name().is_some());
            }
        }
    }

    // Invariant 7: Welcome never changes the state
    #[test]
    fn prop_welcome_is_side_channel(state in arb_state()) {
        let result = transition(&state, Event::Welcome);
        prop_assert_eq!(&result.new_state, &state);
        prop_assert_eq!(result.reply(), Some(&Reply::Welcome));
    }
}
