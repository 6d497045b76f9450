//! Effects produced by state transitions

use super::state::Record;

/// Outbound messages the dialogue can produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Welcome,
    AskName,
    AskEmail,
    InvalidEmail,
    Saved { name: String },
    SaveFailed,
}

impl Reply {
    /// Text sent to the chat
    pub fn text(&self) -> String {
        match self {
            Reply::Welcome => "Welcome! Type /add to save your information.".to_string(),
            Reply::AskName => "Please provide your name:".to_string(),
            Reply::AskEmail => "Thank you! Now, please provide your email:".to_string(),
            Reply::InvalidEmail => {
                "Invalid email. Please provide a valid email address:".to_string()
            }
            Reply::Saved { name } => {
                format!("Thank you, {name}! Your information has been saved.")
            }
            Reply::SaveFailed => "An error occurred while saving your information.".to_string(),
        }
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a message to the conversation
    Reply(Reply),

    /// Persist a completed record, then send `confirmation`
    /// (or [`Reply::SaveFailed`] if the write fails)
    SaveRecord { record: Record, confirmation: Reply },
}

impl Effect {
    pub fn save_record(record: Record) -> Self {
        let confirmation = Reply::Saved {
            name: record.name.clone(),
        };
        Effect::SaveRecord {
            record,
            confirmation,
        }
    }
}
