//! Telegram Bot API transport
//!
//! Long-polling for inbound messages and `sendMessage` for replies.

mod client;
mod error;
mod types;

pub use client::TelegramClient;
pub use error::TransportError;
pub use types::Update;
