//! API response types

use serde::Serialize;

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Chats currently part-way through a dialogue
    pub active_sessions: usize,
    /// Chats with a live worker
    pub conversations: usize,
    /// Stored records, absent when the store cannot be reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
}
