//! Intake dialogue state types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Conversation Identity
// ============================================================================

/// Stable identifier of one chat, as supplied by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ============================================================================
// Dialogue State
// ============================================================================

/// Dialogue step without the collected data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    None,
    AwaitingName,
    AwaitingEmail,
}

/// Per-conversation dialogue state
///
/// `Idle` is never held by a session store: a chat without an entry is idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntakeState {
    /// No collection in progress
    #[default]
    Idle,

    /// Start trigger received, waiting for the name
    AwaitingName,

    /// Name collected, waiting for a valid email
    AwaitingEmail { name: String },
}

impl IntakeState {
    pub fn step(&self) -> Step {
        match self {
            IntakeState::Idle => Step::None,
            IntakeState::AwaitingName => Step::AwaitingName,
            IntakeState::AwaitingEmail { .. } => Step::AwaitingEmail,
        }
    }

    /// Whether a session exists for this state (mid-dialogue)
    pub fn is_active(&self) -> bool {
        !matches!(self, IntakeState::Idle)
    }

    /// The collected name, once past the first step
    #[cfg(test)]
    pub fn name(&self) -> Option<&str> {
        match self {
            IntakeState::AwaitingEmail { name } => Some(name),
            IntakeState::Idle | IntakeState::AwaitingName => None,
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// A completed, validated intake result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub email: String,
}

impl Record {
    /// Build a record, returning `None` when the email fails validation
    pub fn validated(name: impl Into<String>, email: impl Into<String>) -> Option<Self> {
        let email = email.into();
        if is_plausible_email(&email) {
            Some(Self {
                name: name.into(),
                email,
            })
        } else {
            None
        }
    }
}

/// Syntactic email check: the text must contain an `@`
pub fn is_plausible_email(text: &str) -> bool {
    text.contains('@')
}
