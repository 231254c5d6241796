use crate::error::AlerterError;
use async_trait::async_trait;
use configuration::TelegramConfig;
use core_types::ChatId;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub mod error;

/// Upper bound for one delivery attempt, so a stalled send can never hold up
/// a subscriber's monitoring cycle.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// The delivery capability the monitoring core notifies through.
///
/// Delivery is fire-and-forget from the core's point of view: a failed send
/// is logged by the caller and never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a text message to one subscriber.
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), AlerterError>;
}

/// The JSON payload for the Telegram `sendMessage` endpoint.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: &'a str, // To allow for formatting like bold, italics etc.
}

/// A client for sending messages to the Telegram Bot API.
///
/// Unlike a single-operator alerter, the chat id is supplied per call: every
/// subscriber gets its own messages.
pub struct TelegramAlerter {
    client: Client,
    token: String,
}

impl TelegramAlerter {
    /// Creates a new `TelegramAlerter`.
    ///
    /// Returns `None` if the token is missing from the configuration,
    /// allowing the system to gracefully disable alerting.
    pub fn new(config: &TelegramConfig) -> Option<Self> {
        if config.token.is_empty() {
            tracing::warn!("Telegram alerter is not configured (missing token).");
            return None;
        }
        Some(Self {
            client: Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .expect("Failed to build reqwest client"),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramAlerter {
    /// Sends a text message to the given Telegram chat.
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), AlerterError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);

        let payload = SendMessagePayload {
            chat_id,
            text,
            parse_mode: "MarkdownV2", // Use Markdown for rich formatting
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(AlerterError::ApiError(error_text));
        }

        Ok(())
    }
}

/// A helper function to escape characters that have special meaning in Telegram's MarkdownV2.
pub fn escape_markdown(text: &str) -> String {
    let special_chars = r"_*[]()~`>#+-=|{}.!";
    special_chars
        .chars()
        .fold(text.to_string(), |s, c| s.replace(c, &format!("\\{}", c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markdown_special_characters() {
        assert_eq!(escape_markdown("1.25%"), "1\\.25%");
        assert_eq!(escape_markdown("ETH_USDT"), "ETH\\_USDT");
        assert_eq!(escape_markdown("plain"), "plain");
    }

    #[test]
    fn alerter_is_disabled_without_a_token() {
        let config = TelegramConfig {
            token: String::new(),
        };
        assert!(TelegramAlerter::new(&config).is_none());
    }
}
