//! Anthropic Messages API client.

use super::{http_client, transport_error, GenerationSettings, TextGenerator};
use crate::error::{BriefingError, Result};
use crate::prompt::BriefingPrompt;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "claude-opus-4-5";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "anthropic";

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: &'a str,
    pub messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

impl MessagesResponse {
    /// Text of the first `text` content block.
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.kind == "text")
            .and_then(|b| b.text.as_deref())
    }
}

pub struct AnthropicGenerator {
    client: reqwest::Client,
    api_key: String,
    settings: GenerationSettings,
}

impl AnthropicGenerator {
    pub fn new(api_key: impl Into<String>, settings: GenerationSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(PROVIDER, settings.timeout)?,
            api_key: api_key.into(),
            settings,
        })
    }

    pub fn request<'a>(&'a self, prompt: &'a BriefingPrompt) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
            system: &prompt.system,
            messages: vec![Message {
                role: "user",
                content: &prompt.user,
            }],
        }
    }
}

/// Pull the completion out of a raw response body.
pub fn parse_response(status: reqwest::StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| format!("{}: {}", e.error.kind, e.error.message))
            .unwrap_or_else(|_| body.chars().take(200).collect());
        return Err(BriefingError::generation(
            PROVIDER,
            format!("HTTP {}: {}", status.as_u16(), detail),
        ));
    }

    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| BriefingError::generation(PROVIDER, format!("malformed response: {}", e)))?;

    match parsed.first_text() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(BriefingError::generation(
            PROVIDER,
            format!(
                "response contained no text (stop_reason: {})",
                parsed.stop_reason.as_deref().unwrap_or("unknown")
            ),
        )),
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, prompt: &BriefingPrompt) -> Result<String> {
        let url = self.settings.endpoint("v1/messages");
        debug!(
            "POST {} model={} max_tokens={}",
            url, self.settings.model, self.settings.max_output_tokens
        );

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| transport_error(PROVIDER, e))?;
        parse_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ProviderKind;
    use reqwest::StatusCode;

    fn prompt() -> BriefingPrompt {
        BriefingPrompt {
            system: "sys".to_string(),
            user: "usr".to_string(),
        }
    }

    #[test]
    fn test_request_shape() {
        let generator =
            AnthropicGenerator::new("key", GenerationSettings::for_provider(ProviderKind::Anthropic))
                .unwrap();
        let p = prompt();
        let json = serde_json::to_value(generator.request(&p)).unwrap();
        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["max_tokens"], 700);
        assert_eq!(json["system"], "sys");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "usr");
    }

    #[test]
    fn test_parse_first_text_block() {
        let body = r#"{"content":[{"type":"thinking","thinking":"hm"},{"type":"text","text":"brief"}],"stop_reason":"end_turn"}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "brief");
    }

    #[test]
    fn test_parse_empty_content_fails() {
        let body = r#"{"content":[],"stop_reason":"max_tokens"}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = parse_response(StatusCode::from_u16(529).unwrap(), body).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("529"));
        assert!(msg.contains("Overloaded"));
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_response(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, BriefingError::Generation { provider: "anthropic", .. }));
    }
}
