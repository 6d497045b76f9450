//! Process configuration from the environment
//!
//! Everything is read and validated once at startup so a bad value fails the
//! process before any dialogue begins.

use crate::state_machine::event::{DEFAULT_START_PATTERN, DEFAULT_WELCOME_PATTERN};
use crate::state_machine::Triggers;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token
    pub bot_token: String,
    /// Record store location (`sqlite://path` or a plain path)
    pub store_uri: String,
    /// Address of the status HTTP server
    pub listen_addr: SocketAddr,
    /// Override for the Bot API endpoint (e.g. a local Bot API server)
    pub api_base: Option<String>,
    /// Long-poll wait per `getUpdates` call
    pub poll_timeout: Duration,
    pub triggers: Triggers,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (used by tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bot_token = var("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let store_uri = var("API_URI").ok_or(ConfigError::Missing("API_URI"))?;

        let host: IpAddr = match var("HOST") {
            Some(h) => h.parse().map_err(|e| invalid("HOST", e))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port: u16 = match var("PORT") {
            Some(p) => p.parse().map_err(|e| invalid("PORT", e))?,
            None => DEFAULT_PORT,
        };
        let poll_timeout_secs: u64 = match var("POLL_TIMEOUT_SECS") {
            Some(t) => t.parse().map_err(|e| invalid("POLL_TIMEOUT_SECS", e))?,
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        let start = var("START_PATTERN").unwrap_or_else(|| DEFAULT_START_PATTERN.to_string());
        let welcome = var("WELCOME_PATTERN").unwrap_or_else(|| DEFAULT_WELCOME_PATTERN.to_string());
        let triggers = Triggers::new(&start, &welcome).map_err(|e| invalid("START_PATTERN/WELCOME_PATTERN", e))?;

        Ok(Self {
            bot_token,
            store_uri,
            listen_addr: SocketAddr::new(host, port),
            api_base: var("TELEGRAM_API_BASE"),
            poll_timeout: Duration::from_secs(poll_timeout_secs),
            triggers,
        })
    }
}

fn invalid(name: &'static str, e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        name,
        message: e.to_string(),
    }
}
