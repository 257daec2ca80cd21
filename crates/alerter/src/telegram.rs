use crate::error::AlerterError;
use configuration::TelegramConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const TELEGRAM_BASE_URL: &str = "https://api.telegram.org";

/// The JSON payload for the Telegram `sendMessage` endpoint.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str, // To allow for formatting like bold, italics etc.
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

/// A client for sending messages to the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramAlerter {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramAlerter {
    /// Creates a new `TelegramAlerter`.
    ///
    /// Returns `None` if the token or chat_id is missing from the configuration,
    /// allowing the system to gracefully disable alerting.
    pub fn new(config: &TelegramConfig) -> Option<Self> {
        Self::with_base_url(config, TELEGRAM_BASE_URL)
    }

    pub fn with_base_url(config: &TelegramConfig, base_url: impl Into<String>) -> Option<Self> {
        if config.token.is_empty() || config.chat_id.is_empty() {
            tracing::warn!("Telegram alerter is not configured (missing token or chat_id).");
            return None;
        }
        Some(Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Sends a text message to the configured Telegram chat.
    pub async fn send_message(&self, message: &str) -> Result<(), AlerterError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let text = escape_markdown(message);

        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text: &text,
            parse_mode: "MarkdownV2",
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to decode error response".to_string());

        match serde_json::from_str::<TelegramResponse>(&body) {
            Ok(parsed) if parsed.ok && status.is_success() => Ok(()),
            Ok(parsed) => Err(AlerterError::Rejected(
                parsed.description.unwrap_or_else(|| format!("HTTP {status}")),
            )),
            Err(_) => Err(AlerterError::Rejected(format!("HTTP {status}: {body}"))),
        }
    }
}

/// A helper function to escape characters that have special meaning in Telegram's MarkdownV2.
fn escape_markdown(text: &str) -> String {
    let special_chars = r"_*[]()~`>#+-=|{}.!";
    special_chars
        .chars()
        .fold(text.to_string(), |s, c| s.replace(c, &format!("\\{}", c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_disable_the_alerter() {
        let config = TelegramConfig {
            token: "abc".to_string(),
            chat_id: String::new(),
        };
        assert!(TelegramAlerter::new(&config).is_none());
    }

    #[test]
    fn escapes_prices_and_dates() {
        assert_eq!(
            escape_markdown("Buy signal triggered for BRK-B at 410.5 on 2024-01-02"),
            r"Buy signal triggered for BRK\-B at 410\.5 on 2024\-01\-02"
        );
    }
}
