//! Telegram Bot API client implementation

use super::types::{ApiResponse, GetUpdatesRequest, SendMessageRequest, Update};
use super::TransportError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Default Bot API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Slack on top of the long-poll timeout before the HTTP request gives up
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Bot API client for one bot token
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(
        token: &str,
        api_base: Option<&str>,
        poll_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let base_url = format!(
            "{}/bot{}",
            api_base.unwrap_or(DEFAULT_API_BASE).trim_end_matches('/'),
            token
        );

        let client = Client::builder()
            .timeout(poll_timeout + HTTP_TIMEOUT_MARGIN)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Long-poll for new updates starting at `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TransportError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: vec!["message".to_string()],
        };
        self.call("getUpdates", &request).await
    }

    /// Send a plain text message to a chat
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        let request = SendMessageRequest { chat_id, text };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // The URL embeds the token, never log it
                let e = e.without_url();
                if e.is_timeout() {
                    TransportError::Network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::Network(format!("Connection failed: {e}"))
                } else {
                    TransportError::Network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                TransportError::Network(format!("Failed to read response: {}", e.without_url()))
            })?;

        let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                TransportError::Malformed(format!("{e} - body: {body}"))
            } else {
                TransportError::from_status(status.as_u16(), &body, None)
            }
        })?;

        if !parsed.ok {
            let code = parsed.error_code.unwrap_or(status.as_u16());
            let description = parsed.description.unwrap_or_default();
            let retry_after = parsed.parameters.and_then(|p| p.retry_after);
            return Err(TransportError::from_status(code, &description, retry_after));
        }

        parsed
            .result
            .ok_or_else(|| TransportError::Malformed(format!("{method}: response without result")))
    }
}
