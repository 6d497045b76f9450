//! Telegram Bot API wire types (the subset the bot uses)

use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

/// An incoming update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub chat: Chat,
    /// Absent for photos, stickers and other non-text messages
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct GetUpdatesRequest {
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}
