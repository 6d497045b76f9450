//! Bot API transport errors

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connect failure, timeout or a body that could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// 429 flood control; the API usually says how long to wait
    #[error("Flood control: {description}")]
    RateLimited {
        description: String,
        retry_after: Option<Duration>,
    },

    #[error("Bot API server error {code}: {description}")]
    Server { code: u16, description: String },

    /// 401, or 404 on the `/bot<token>` path: the token is wrong or revoked
    #[error("Bot token rejected: {0}")]
    Unauthorized(String),

    /// 409: a webhook is set or another process is polling the same bot
    #[error("Update stream conflict: {0}")]
    Conflict(String),

    /// Any other refusal, e.g. 400 "chat not found" or 403 "bot was blocked"
    #[error("Request rejected ({code}): {description}")]
    Rejected { code: u16, description: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Map an error status and the API's description to a variant
    pub fn from_status(code: u16, description: &str, retry_after: Option<u64>) -> Self {
        let description = description.to_string();
        match code {
            401 | 404 => Self::Unauthorized(description),
            409 => Self::Conflict(description),
            429 => Self::RateLimited {
                description,
                retry_after: retry_after.map(Duration::from_secs),
            },
            500..=599 => Self::Server { code, description },
            _ => Self::Rejected { code, description },
        }
    }

    /// Whether repeating the same call can succeed without operator action
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited { .. } | Self::Server { .. } | Self::Conflict(_)
        )
    }

    /// Wait requested by the API, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
