//! Conversation runtime executor

use super::traits::{MessageSender, RecordSink};
use super::Registry;
use crate::session_store::SessionStore;
use crate::state_machine::{transition, ChatId, Effect, Event, Reply};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Worker for a single chat. Events arrive over one channel and are applied
/// strictly in order; a slow effect only delays this chat.
pub struct ConversationRuntime<S, R, M>
where
    S: SessionStore + 'static,
    R: RecordSink + 'static,
    M: MessageSender + 'static,
{
    chat_id: ChatId,
    sessions: Arc<S>,
    sink: Arc<R>,
    sender: Arc<M>,
    event_rx: mpsc::UnboundedReceiver<Event>,
    registry: Registry,
}

impl<S, R, M> ConversationRuntime<S, R, M>
where
    S: SessionStore + 'static,
    R: RecordSink + 'static,
    M: MessageSender + 'static,
{
    pub fn new(
        chat_id: ChatId,
        sessions: Arc<S>,
        sink: Arc<R>,
        sender: Arc<M>,
        event_rx: mpsc::UnboundedReceiver<Event>,
        registry: Registry,
    ) -> Self {
        Self {
            chat_id,
            sessions,
            sink,
            sender,
            event_rx,
            registry,
        }
    }

    pub async fn run(mut self) {
        tracing::debug!(chat_id = %self.chat_id, "Starting conversation runtime");

        while let Some(event) = self.event_rx.recv().await {
            let in_dialogue = self.process_event(event).await;
            if !in_dialogue && self.try_retire().await {
                break;
            }
        }

        tracing::debug!(chat_id = %self.chat_id, "Conversation runtime stopped");
    }

    /// Deregister if nothing is queued. Dispatchers only send under the read
    /// lock, so no event can slip in between the check and the removal.
    async fn try_retire(&self) -> bool {
        let mut runtimes = self.registry.write().await;
        if !self.event_rx.is_empty() {
            return false;
        }
        runtimes.remove(&self.chat_id);
        true
    }

    /// Apply one event; returns whether the chat is still mid-dialogue
    async fn process_event(&mut self, event: Event) -> bool {
        let state = self.sessions.get(self.chat_id).await.unwrap_or_default();

        // Pure state transition
        let result = transition(&state, event);

        if result.effects.is_empty() && !state.is_active() {
            tracing::debug!(chat_id = %self.chat_id, "Ignoring message outside a dialogue");
            return false;
        }

        if result.new_state != state {
            tracing::info!(
                chat_id = %self.chat_id,
                from = ?state.step(),
                to = ?result.new_state.step(),
                "Dialogue step changed"
            );
        }

        // The session is settled before any I/O, so a failed write can
        // never leave a partial session behind
        let in_dialogue = result.new_state.is_active();
        if in_dialogue {
            self.sessions.put(self.chat_id, result.new_state).await;
        } else {
            self.sessions.remove(self.chat_id).await;
        }

        for effect in result.effects {
            self.execute_effect(effect).await;
        }
        in_dialogue
    }

    async fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::Reply(reply) => self.send(&reply).await,

            Effect::SaveRecord {
                record,
                confirmation,
            } => match self.sink.persist(&record).await {
                Ok(()) => {
                    tracing::info!(chat_id = %self.chat_id, "Saved intake record");
                    self.send(&confirmation).await;
                }
                Err(e) => {
                    tracing::error!(chat_id = %self.chat_id, error = %e, "Failed to save intake record");
                    self.send(&Reply::SaveFailed).await;
                }
            },
        }
    }

    /// Fire-and-forget delivery; failures are only logged
    async fn send(&self, reply: &Reply) {
        if let Err(e) = self.sender.send_message(self.chat_id, &reply.text()).await {
            tracing::warn!(
                chat_id = %self.chat_id,
                error = %e,
                transient = e.is_transient(),
                "Failed to send message"
            );
        }
    }
}
