//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::state_machine::{ChatId, Record};
use crate::telegram::{TransportError, Update};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A single persistence attempt failed. Connection and write failures are
/// not distinguished.
#[derive(Debug, Error)]
#[error("Failed to persist record: {0}")]
pub struct PersistError(pub String);

/// Destination for completed intake records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Make exactly one attempt to persist `record`
    async fn persist(&self, record: &Record) -> Result<(), PersistError>;
}

/// Outbound half of the messaging transport
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError>;
}

/// Inbound half of the messaging transport
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetch updates with `update_id >= offset`, waiting up to `timeout`
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TransportError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: RecordSink + ?Sized> RecordSink for Arc<T> {
    async fn persist(&self, record: &Record) -> Result<(), PersistError> {
        (**self).persist(record).await
    }
}

#[async_trait]
impl<T: MessageSender + ?Sized> MessageSender for Arc<T> {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        (**self).send_message(chat_id, text).await
    }
}

#[async_trait]
impl<T: UpdateSource + ?Sized> UpdateSource for Arc<T> {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TransportError> {
        (**self).get_updates(offset, timeout).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

use crate::db::UserDatabase;
use crate::telegram::TelegramClient;

/// Adapter to use `UserDatabase` as a `RecordSink`
#[derive(Clone)]
pub struct DatabaseSink {
    db: UserDatabase,
}

impl DatabaseSink {
    pub fn new(db: UserDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordSink for DatabaseSink {
    async fn persist(&self, record: &Record) -> Result<(), PersistError> {
        let db = self.db.clone();
        let record = record.clone();
        // SQLite is blocking; keep it off the async workers
        let row = tokio::task::spawn_blocking(move || db.insert_user(&record))
            .await
            .map_err(|e| PersistError(format!("Insert task failed: {e}")))?
            .map_err(|e| PersistError(e.to_string()))?;
        tracing::debug!(user_id = %row.id, "Inserted user");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        TelegramClient::send_message(self, chat_id.0, text).await
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TransportError> {
        TelegramClient::get_updates(self, offset, timeout).await
    }
}
