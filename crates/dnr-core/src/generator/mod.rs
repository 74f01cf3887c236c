pub mod anthropic;
pub mod gemini;

pub use anthropic::AnthropicGenerator;
pub use gemini::GeminiGenerator;

use crate::error::{BriefingError, Result};
use crate::prompt::{BriefingPrompt, MAX_OUTPUT_TOKENS_LIMIT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Anything that can turn a briefing prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Single attempt; every failure surfaces as [`BriefingError::Generation`].
    async fn generate(&self, prompt: &BriefingPrompt) -> Result<String>;
}

/// Which generation service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::DEFAULT_MODEL,
            Self::Gemini => gemini::DEFAULT_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::DEFAULT_BASE_URL,
            Self::Gemini => gemini::DEFAULT_BASE_URL,
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = BriefingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(BriefingError::InvalidSettings(format!(
                "unknown provider '{}' (expected 'anthropic' or 'gemini')",
                other
            ))),
        }
    }
}

/// Request parameters shared by every provider.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub base_url: String,
}

impl GenerationSettings {
    pub fn for_provider(kind: ProviderKind) -> Self {
        Self {
            model: kind.default_model().to_string(),
            max_output_tokens: 700,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            base_url: kind.default_base_url().to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
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
        if self.model.trim().is_empty() {
            return Err(BriefingError::InvalidSettings("model must not be empty".into()));
        }
        if self.max_output_tokens == 0 || self.max_output_tokens > MAX_OUTPUT_TOKENS_LIMIT {
            return Err(BriefingError::InvalidSettings(format!(
                "max_output_tokens must be in 1..={}, got {}",
                MAX_OUTPUT_TOKENS_LIMIT, self.max_output_tokens
            )));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(BriefingError::InvalidSettings(format!(
                "temperature must be in 0.0..=1.0, got {}",
                self.temperature
            )));
        }
        if self.timeout.is_zero() {
            return Err(BriefingError::InvalidSettings("generation timeout must be non-zero".into()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(BriefingError::InvalidSettings(format!(
                "generation base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn http_client(provider: &'static str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BriefingError::generation(provider, format!("failed to build HTTP client: {}", e)))
}

/// Map a transport error to a generation failure, naming timeouts explicitly.
fn transport_error(provider: &'static str, err: reqwest::Error) -> BriefingError {
    if err.is_timeout() {
        BriefingError::generation(provider, "request timed out")
    } else {
        BriefingError::generation(provider, format!("HTTP request failed: {}", err.without_url()))
    }
}

/// Build the configured generator. Settings are validated first.
pub fn build_generator(
    kind: ProviderKind,
    api_key: impl Into<String>,
    settings: GenerationSettings,
) -> Result<Arc<dyn TextGenerator>> {
    settings.validate()?;
    let generator: Arc<dyn TextGenerator> = match kind {
        ProviderKind::Anthropic => Arc::new(AnthropicGenerator::new(api_key, settings)?),
        ProviderKind::Gemini => Arc::new(GeminiGenerator::new(api_key, settings)?),
    };
    Ok(generator)
}
