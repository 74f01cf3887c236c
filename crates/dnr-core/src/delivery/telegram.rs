//! Telegram Bot API `sendMessage` delivery.

use super::Dispatcher;
use crate::error::{BriefingError, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Telegram rejects messages longer than this.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Numeric chat ids are sent as JSON numbers, `@channel` handles as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl From<&str> for ChatId {
    fn from(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(id) => ChatId::Id(id),
            Err(_) => ChatId::Username(s.to_string()),
        }
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{}", id),
            ChatId::Username(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a ChatId,
    pub text: &'a str,
    pub parse_mode: &'static str,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: ChatId,
    pub timeout: Duration,
    pub base_url: String,
}

// Hand-written so the token never lands in logs.
impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TelegramSettings {
    pub fn new(bot_token: impl Into<String>, chat_id: &str) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: ChatId::from(chat_id),
            timeout: Duration::from_secs(15),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            return Err(BriefingError::InvalidSettings("Telegram bot token must not be empty".into()));
        }
        if matches!(&self.chat_id, ChatId::Username(s) if s.is_empty()) {
            return Err(BriefingError::InvalidSettings("Telegram chat id must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(BriefingError::InvalidSettings("delivery timeout must be non-zero".into()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(BriefingError::InvalidSettings(format!(
                "delivery base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.base_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

pub struct TelegramDispatcher {
    client: reqwest::Client,
    settings: TelegramSettings,
}

impl TelegramDispatcher {
    pub fn new(settings: TelegramSettings) -> Result<Self> {
        settings.validate()?;
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BriefingError::delivery(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, settings })
    }

    pub fn payload<'a>(&'a self, text: &'a str) -> SendMessage<'a> {
        SendMessage {
            chat_id: &self.settings.chat_id,
            text,
            parse_mode: "Markdown",
        }
    }
}

/// Interpret a `sendMessage` reply. Success is decided by the `ok` flag, not
/// the HTTP status.
pub fn parse_response(status: reqwest::StatusCode, body: &str) -> Result<()> {
    let parsed: ApiResponse = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => {
            return Err(BriefingError::delivery(format!(
                "HTTP {}: unreadable response ({})",
                status.as_u16(),
                e
            )))
        }
    };

    if parsed.ok {
        return Ok(());
    }

    let description = parsed.description.as_deref().unwrap_or("no description");
    Err(BriefingError::delivery(match parsed.error_code {
        Some(code) => format!("Telegram API error {}: {}", code, description),
        None => format!("Telegram API error: {}", description),
    }))
}

#[async_trait]
impl Dispatcher for TelegramDispatcher {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    async fn deliver(&self, text: &str) -> Result<()> {
        let chars = text.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            warn!(
                "Brief is {} characters, above Telegram's {} limit; sending anyway",
                chars, MAX_MESSAGE_CHARS
            );
        }
        debug!("sendMessage chat_id={} chars={}", self.settings.chat_id, chars);

        // without_url(): the request URL embeds the bot token
        let resp = self
            .client
            .post(self.settings.send_message_url())
            .json(&self.payload(text))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BriefingError::delivery("request timed out")
                } else {
                    BriefingError::delivery(format!("HTTP request failed: {}", e.without_url()))
                }
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| BriefingError::delivery(format!("failed to read response: {}", e.without_url())))?;
        parse_response(status, &body)
    }
}
