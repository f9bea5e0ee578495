//! Telegram bot notifier
//!
//! Sends change notices with the Bot API `sendMessage` method using HTML
//! parse mode. The bot token is part of the request path, so transport
//! errors are stripped of their URL before they are reported.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sheetwatch_core::{ChangeNotice, ConfigError, Notifier, NotifyError, RecipientId};
use std::time::Duration;

/// Public Bot API host
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Bound on a single send
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct BotReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Notifier backed by a Telegram bot
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: SecretString,
    api_base: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// Notifier against the public Bot API
    ///
    /// # Errors
    /// Returns `ConfigError` if the token is blank or the HTTP client cannot
    /// be built.
    pub fn new(token: SecretString, timeout: Duration) -> Result<Self, ConfigError> {
        Self::with_api_base(token, timeout, DEFAULT_TELEGRAM_API)
    }

    /// Notifier against an explicit API host
    ///
    /// # Errors
    /// Returns `ConfigError` if the token or host is blank or the HTTP
    /// client cannot be built.
    pub fn with_api_base(
        token: SecretString,
        timeout: Duration,
        api_base: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Missing("TELEGRAM_TOKEN"));
        }
        let api_base = api_base.into();
        if api_base.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "telegram_api",
                reason: "must not be empty".to_string(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ConfigError::Invalid {
                field: "telegram_api",
                reason: error.without_url().to_string(),
            })?;
        Ok(Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.token.expose_secret().trim()
        )
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(
        &self,
        recipient: &RecipientId,
        notice: &ChangeNotice,
    ) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: recipient.as_str(),
            text: notice.html(),
            parse_mode: "HTML",
        };
        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    NotifyError::Timeout
                } else {
                    NotifyError::Transport(error.without_url().to_string())
                }
            })?;

        let status = response.status();
        let reply = response.json::<BotReply>().await.ok();
        match reply {
            Some(BotReply { ok: true, .. }) if status.is_success() => {
                tracing::debug!(%recipient, "telegram accepted message");
                Ok(())
            }
            reply => Err(NotifyError::Rejected {
                status: Some(status.as_u16()),
                description: reply
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| status.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_a_config_error() {
        let err = TelegramNotifier::new(SecretString::from("  "), DEFAULT_NOTIFY_TIMEOUT)
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_TOKEN"));
    }

    #[test]
    fn url_embeds_token_and_trims_base() {
        let notifier = TelegramNotifier::with_api_base(
            SecretString::from("123:abc"),
            DEFAULT_NOTIFY_TIMEOUT,
            "http://127.0.0.1:9/",
        )
        .unwrap();
        assert_eq!(
            notifier.send_message_url(),
            "http://127.0.0.1:9/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn debug_hides_token() {
        let notifier =
            TelegramNotifier::new(SecretString::from("123:secret"), DEFAULT_NOTIFY_TIMEOUT)
                .unwrap();
        assert!(!format!("{notifier:?}").contains("secret"));
    }
}
