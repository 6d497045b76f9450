//! Runtime for executing intake conversations
//!
//! One worker task per chat serializes that chat's events while different
//! chats proceed concurrently. A worker retires once its queue is empty and
//! its chat has no session; the next event for that chat starts a new one.

mod executor;
mod poller;
pub mod traits;


pub use executor::ConversationRuntime;
pub use poller::run_polling;
pub use traits::*;

use crate::session_store::{InMemorySessionStore, SessionStore};
use crate::state_machine::{ChatId, Event};
use crate::telegram::TelegramClient;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio_util::task::TaskTracker;

/// Type alias for the production manager with concrete implementations
pub type ProductionManager = RuntimeManager<InMemorySessionStore, DatabaseSink, TelegramClient>;

/// Live workers by chat. Senders are only used while holding the read lock,
/// so a worker holding the write lock sees a stable queue.
pub(crate) type Registry = Arc<RwLock<HashMap<ChatId, ConversationHandle>>>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Conversation runtime for chat {0} is gone")]
    RuntimeGone(ChatId),
}

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    /// Unbounded: queueing never blocks the poller behind a slow chat
    pub event_tx: mpsc::UnboundedSender<Event>,
}

/// Manager for all conversation runtimes
pub struct RuntimeManager<S, R, M>
where
    S: SessionStore + 'static,
    R: RecordSink + 'static,
    M: MessageSender + 'static,
{
    sessions: Arc<S>,
    sink: Arc<R>,
    sender: Arc<M>,
    runtimes: Registry,
    tasks: TaskTracker,
}

impl<S, R, M> RuntimeManager<S, R, M>
where
    S: SessionStore + 'static,
    R: RecordSink + 'static,
    M: MessageSender + 'static,
{
    pub fn new(sessions: Arc<S>, sink: Arc<R>, sender: Arc<M>) -> Self {
        Self {
            sessions,
            sink,
            sender,
            runtimes: Arc::new(RwLock::new(HashMap::new())),
            tasks: TaskTracker::new(),
        }
    }

    /// Queue an event for a chat, preserving arrival order per chat.
    /// Never waits on the chat's worker.
    pub async fn dispatch(&self, chat_id: ChatId, event: Event) -> Result<(), RuntimeError> {
        let event = {
            let runtimes = self.runtimes.read().await;
            match runtimes.get(&chat_id) {
                Some(handle) => match handle.event_tx.send(event) {
                    Ok(()) => return Ok(()),
                    Err(mpsc::error::SendError(event)) => event,
                },
                None => event,
            }
        };

        let mut runtimes = self.runtimes.write().await;
        // Another dispatcher may have started a worker meanwhile
        let event = match runtimes.get(&chat_id) {
            Some(handle) => match handle.event_tx.send(event) {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(event)) => {
                    // Workers deregister before exiting; a closed queue means a panic
                    tracing::warn!(chat_id = %chat_id, "Conversation runtime stopped, restarting");
                    runtimes.remove(&chat_id);
                    event
                }
            },
            None => event,
        };

        let handle = self.spawn_runtime(chat_id);
        handle
            .event_tx
            .send(event)
            .map_err(|_| RuntimeError::RuntimeGone(chat_id))?;
        runtimes.insert(chat_id, handle);
        Ok(())
    }

    fn spawn_runtime(&self, chat_id: ChatId) -> ConversationHandle {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let runtime = ConversationRuntime::new(
            chat_id,
            self.sessions.clone(),
            self.sink.clone(),
            self.sender.clone(),
            event_rx,
            self.runtimes.clone(),
        );

        self.tasks.spawn(async move {
            runtime.run().await;
        });

        ConversationHandle { event_tx }
    }

    /// Number of chats with a live worker
    pub async fn conversation_count(&self) -> usize {
        self.runtimes.read().await.len()
    }

    /// Get the session store
    pub fn sessions(&self) -> &Arc<S> {
        &self.sessions
    }

    /// Close every conversation channel and wait until the workers have
    /// applied their queued events and exited
    pub async fn shutdown(&self) {
        let drained = std::mem::take(&mut *self.runtimes.write().await);
        tracing::info!(conversations = drained.len(), "Stopping conversation runtimes");
        drop(drained);

        self.tasks.close();
        self.tasks.wait().await;
        tracing::info!("Conversation runtimes stopped");
    }
}
