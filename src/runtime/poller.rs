//! Inbound update loop
//!
//! Pulls updates from the transport, classifies their text and hands them to
//! the [`RuntimeManager`] in arrival order.

use super::traits::{MessageSender, RecordSink, UpdateSource};
use super::RuntimeManager;
use crate::session_store::SessionStore;
use crate::state_machine::{ChatId, Triggers};
use crate::telegram::{TransportError, Update};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Poll `source` until `cancel` fires
pub async fn run_polling<U, S, R, M>(
    source: &U,
    manager: &RuntimeManager<S, R, M>,
    triggers: &Triggers,
    poll_timeout: Duration,
    cancel: CancellationToken,
) where
    U: UpdateSource + ?Sized,
    S: SessionStore + 'static,
    R: RecordSink + 'static,
    M: MessageSender + 'static,
{
    let mut offset: Option<i64> = None;
    let mut failures: u32 = 0;

    tracing::info!("Polling for updates");

    loop {
        let batch = tokio::select! {
            biased;

            () = cancel.cancelled() => break,
            batch = source.get_updates(offset, poll_timeout) => batch,
        };

        match batch {
            Ok(updates) => {
                failures = 0;
                for update in updates {
                    offset = Some(update.update_id + 1);
                    dispatch_update(manager, triggers, update).await;
                }
            }
            Err(e) => {
                failures += 1;
                let delay = backoff_for(&e, failures);
                if e.is_transient() {
                    tracing::warn!(error = %e, delay_ms = %delay.as_millis(), "Polling failed, backing off");
                } else {
                    tracing::error!(
                        error = %e,
                        delay_ms = %delay.as_millis(),
                        "Polling rejected, needs operator attention"
                    );
                }
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    tracing::info!("Polling stopped");
}

async fn dispatch_update<S, R, M>(manager: &RuntimeManager<S, R, M>, triggers: &Triggers, update: Update)
where
    S: SessionStore + 'static,
    R: RecordSink + 'static,
    M: MessageSender + 'static,
{
    let Some(message) = update.message else {
        tracing::debug!(update_id = update.update_id, "Skipping update without message");
        return;
    };
    let chat_id = ChatId(message.chat.id);
    let Some(text) = message.text else {
        tracing::debug!(chat_id = %chat_id, "Skipping non-text message");
        return;
    };

    let event = triggers.classify(&text);
    if let Err(e) = manager.dispatch(chat_id, event).await {
        tracing::error!(chat_id = %chat_id, error = %e, "Failed to dispatch message");
    }
}

/// Delay before the next poll after `attempt` consecutive failures.
/// Errors that repeating cannot fix wait the maximum.
fn backoff_for(error: &TransportError, attempt: u32) -> Duration {
    if let Some(wait) = error.retry_after() {
        return wait;
    }
    if error.is_transient() {
        retry_delay(attempt)
    } else {
        MAX_BACKOFF
    }
}

fn retry_delay(attempt: u32) -> Duration {
    // Exponential backoff: 1s, 2s, 4s ... capped
    let secs = 1u64 << attempt.saturating_sub(1).min(5);
    Duration::from_secs(secs).min(MAX_BACKOFF)
}
