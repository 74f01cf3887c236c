//! Google Gemini `generateContent` client. Gemini receives the system and
//! user text as one combined prompt.

use super::{http_client, transport_error, GenerationSettings, TextGenerator};
use crate::error::{BriefingError, Result};
use crate::prompt::BriefingPrompt;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PROVIDER: &str = "gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    /// Set on reasoning summaries from thinking models
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// First candidate's first text part, skipping thought parts and
    /// non-text parts.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter(|p| !p.thought)
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    settings: GenerationSettings,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, settings: GenerationSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(PROVIDER, settings.timeout)?,
            api_key: api_key.into(),
            settings,
        })
    }

    pub fn request(&self, prompt: &BriefingPrompt) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.combined()),
                    thought: false,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.settings.max_output_tokens,
                temperature: self.settings.temperature,
            },
        }
    }
}

pub fn parse_response(status: reqwest::StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| format!("{}: {}", e.error.status, e.error.message))
            .unwrap_or_else(|_| body.chars().take(200).collect());
        return Err(BriefingError::generation(
            PROVIDER,
            format!("HTTP {}: {}", status.as_u16(), detail),
        ));
    }

    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| BriefingError::generation(PROVIDER, format!("malformed response: {}", e)))?;

    if let Some(text) = parsed.first_text().filter(|t| !t.trim().is_empty()) {
        return Ok(text.to_string());
    }

    let reason = parsed
        .candidates
        .first()
        .and_then(|c| c.finish_reason.clone())
        .unwrap_or_else(|| "no candidates".to_string());
    Err(BriefingError::generation(
        PROVIDER,
        format!("response contained no text ({})", reason),
    ))
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, prompt: &BriefingPrompt) -> Result<String> {
        let url = self
            .settings
            .endpoint(&format!("v1beta/models/{}:generateContent", self.settings.model));
        debug!(
            "POST {} maxOutputTokens={}",
            url, self.settings.max_output_tokens
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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

    #[test]
    fn test_request_uses_combined_prompt_and_camel_case() {
        let generator =
            GeminiGenerator::new("key", GenerationSettings::for_provider(ProviderKind::Gemini)).unwrap();
        let prompt = BriefingPrompt {
            system: "sys".to_string(),
            user: "usr".to_string(),
        };
        let json = serde_json::to_value(generator.request(&prompt)).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "sys\n\nusr");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 700);
        assert!(json["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_parse_first_candidate_first_part() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"one"},{"text":"two"}]},"finishReason":"STOP"},{"content":{"parts":[{"text":"other"}]}}]}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "one");
    }

    #[test]
    fn test_parse_skips_thought_and_non_text_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[
            {"thought":true,"text":"planning the brief"},
            {"inlineData":{"mimeType":"image/png","data":"AAAA"}},
            {"text":"the brief"}
        ]}}]}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "the brief");
    }

    #[test]
    fn test_parse_only_thought_parts_fails() {
        let body = r#"{"candidates":[{"content":{"parts":[{"thought":true,"text":"hmm"}]},"finishReason":"MAX_TOKENS"}]}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_request_omits_thought_flag() {
        let generator =
            GeminiGenerator::new("key", GenerationSettings::for_provider(ProviderKind::Gemini)).unwrap();
        let prompt = BriefingPrompt {
            system: "sys".to_string(),
            user: "usr".to_string(),
        };
        let json = serde_json::to_value(generator.request(&prompt)).unwrap();
        assert!(json["contents"][0]["parts"][0].get("thought").is_none());
    }

    #[test]
    fn test_parse_empty_candidates_fails() {
        let err = parse_response(StatusCode::OK, r#"{"candidates":[]}"#).unwrap_err();
        assert!(err.to_string().contains("no candidates"));
    }

    #[test]
    fn test_parse_blocked_candidate_reports_finish_reason() {
        let body = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{"error":{"code":403,"status":"PERMISSION_DENIED","message":"API key not valid"}}"#;
        let err = parse_response(StatusCode::FORBIDDEN, body).unwrap_err();
        assert!(err.to_string().contains("PERMISSION_DENIED"));
    }
}
