//! Session storage for in-progress dialogues
//!
//! A chat has an entry only while it is mid-dialogue. Storing
//! [`IntakeState::Idle`] removes the entry instead.

use crate::state_machine::{ChatId, IntakeState};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mapping from conversation identity to dialogue state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session, `None` when the chat is idle
    async fn get(&self, chat_id: ChatId) -> Option<IntakeState>;

    /// Overwrite the session. Storing `Idle` is equivalent to [`SessionStore::remove`].
    async fn put(&self, chat_id: ChatId, state: IntakeState);

    /// Drop the session; no-op if absent
    async fn remove(&self, chat_id: ChatId);
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, chat_id: ChatId) -> Option<IntakeState> {
        (**self).get(chat_id).await
    }

    async fn put(&self, chat_id: ChatId, state: IntakeState) {
        (**self).put(chat_id, state).await;
    }

    async fn remove(&self, chat_id: ChatId) {
        (**self).remove(chat_id).await;
    }
}

/// Process-local session store, lost on restart
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<ChatId, IntakeState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chats currently mid-dialogue
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat_id: ChatId) -> Option<IntakeState> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    async fn put(&self, chat_id: ChatId, state: IntakeState) {
        let mut sessions = self.sessions.write().await;
        if state.is_active() {
            sessions.insert(chat_id, state);
        } else {
            sessions.remove(&chat_id);
        }
    }

    async fn remove(&self, chat_id: ChatId) {
        self.sessions.write().await.remove(&chat_id);
    }
}
