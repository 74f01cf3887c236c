use anyhow::{bail, Context};
use clap::Parser;
use dnr_core::delivery::telegram;
use dnr_core::{GenerationSettings, ProviderKind, TelegramSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Tuning file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "dnr-brief.toml";

#[derive(Parser, Clone)]
#[command(name = "dnr-brief")]
#[command(version, about = "Generate the DNR Capital daily brief and send it to Telegram")]
pub struct Cli {
    /// TOML file with model and timeout tuning [default: dnr-brief.toml, if present]
    #[arg(long, env = "DNR_BRIEF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Generation provider (anthropic | gemini); overrides the config file
    #[arg(long, env = "DNR_BRIEF_PROVIDER")]
    pub provider: Option<ProviderKind>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Bot token from BotFather
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: String,

    /// Destination chat: numeric id or @channel
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: String,
}

/// Non-secret tuning read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub generation: GenerationSection,
    pub delivery: DeliverySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSection {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub base_url: Option<String>,
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            max_output_tokens: 700,
            temperature: 0.7,
            timeout_secs: 30,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliverySection {
    pub timeout_secs: u64,
    pub base_url: String,
}

impl Default for DeliverySection {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            base_url: telegram::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// A missing file means defaults; an unreadable or malformed one is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!("No {} found, using built-in defaults", path.display());
            Ok(Self::default())
        }
    }

    /// An explicitly named file must exist. Without one, [`DEFAULT_CONFIG_PATH`]
    /// is used if present.
    pub fn from_cli(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => {
                info!("Loading config from {}", path.display());
                Self::load(path)
            }
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
        }
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub generation: GenerationSettings,
    pub telegram: TelegramSettings,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("generation", &self.generation)
            .field("telegram", &self.telegram)
            .finish()
    }
}

impl AppConfig {
    pub fn resolve(cli: Cli, file: FileConfig) -> anyhow::Result<Self> {
        let provider = cli.provider.unwrap_or(file.generation.provider);

        let api_key = match provider {
            ProviderKind::Anthropic => cli.anthropic_api_key,
            ProviderKind::Gemini => cli.gemini_api_key,
        }
        .filter(|k| !k.trim().is_empty());
        let Some(api_key) = api_key else {
            bail!(
                "{} must be set when the {} provider is selected",
                provider.api_key_env(),
                provider
            );
        };

        let mut generation = GenerationSettings::for_provider(provider)
            .with_max_output_tokens(file.generation.max_output_tokens)
            .with_temperature(file.generation.temperature)
            .with_timeout(Duration::from_secs(file.generation.timeout_secs));
        if let Some(model) = file.generation.model {
            generation = generation.with_model(model);
        }
        if let Some(base_url) = file.generation.base_url {
            generation = generation.with_base_url(base_url);
        }
        generation.validate()?;

        let telegram = TelegramSettings::new(cli.telegram_bot_token, &cli.telegram_chat_id)
            .with_timeout(Duration::from_secs(file.delivery.timeout_secs))
            .with_base_url(file.delivery.base_url);
        telegram.validate()?;

        Ok(Self {
            provider,
            api_key,
            generation,
            telegram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnr_core::MAX_OUTPUT_TOKENS_LIMIT;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["dnr-brief", "--telegram-bot-token", "123:ABC", "--telegram-chat-id", "42"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_resolve_to_anthropic() {
        let config = AppConfig::resolve(cli(&["--anthropic-api-key", "sk"]), FileConfig::default()).unwrap();
        assert_eq!(config.provider, ProviderKind::Anthropic);
        assert_eq!(config.api_key, "sk");
        assert_eq!(config.generation.model, "claude-opus-4-5");
        assert_eq!(config.generation.max_output_tokens, 700);
        assert_eq!(config.generation.timeout, Duration::from_secs(30));
        assert_eq!(config.telegram.timeout, Duration::from_secs(15));
        assert_eq!(config.telegram.base_url, "https://api.telegram.org");
    }

    #[test]
    fn test_missing_provider_key_is_an_error() {
        let err = AppConfig::resolve(cli(&["--gemini-api-key", "g"]), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_cli_provider_overrides_file() {
        let mut file = FileConfig::default();
        file.generation.provider = ProviderKind::Anthropic;
        let config = AppConfig::resolve(cli(&["--provider", "gemini", "--gemini-api-key", "g"]), file).unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.generation.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_output_token_limit_rejected_at_startup() {
        let mut file = FileConfig::default();
        file.generation.max_output_tokens = MAX_OUTPUT_TOKENS_LIMIT + 1;
        assert!(AppConfig::resolve(cli(&["--anthropic-api-key", "sk"]), file).is_err());
    }

    #[test]
    fn test_load_toml_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
[generation]
provider = "gemini"
model = "gemini-1.5-pro"
max_output_tokens = 600
timeout_secs = 20

[delivery]
timeout_secs = 5
base_url = "http://localhost:8081"
"#
        )
        .unwrap();

        let file = FileConfig::load_or_default(f.path()).unwrap();
        let config = AppConfig::resolve(cli(&["--gemini-api-key", "g"]), file).unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.generation.model, "gemini-1.5-pro");
        assert_eq!(config.generation.max_output_tokens, 600);
        assert!((config.generation.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.generation.timeout, Duration::from_secs(20));
        assert_eq!(config.telegram.timeout, Duration::from_secs(5));
        assert_eq!(config.telegram.base_url, "http://localhost:8081");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(file.generation.max_output_tokens, 700);
        assert_eq!(file.delivery.timeout_secs, 15);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dnr-brif.toml");
        let err = FileConfig::from_cli(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("dnr-brif.toml"));
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[delivery]\ntimeout_secs = 3").unwrap();
        let file = FileConfig::from_cli(Some(f.path())).unwrap();
        assert_eq!(file.delivery.timeout_secs, 3);
    }

    #[test]
    fn test_config_flag_is_optional() {
        assert!(cli(&[]).config.is_none());
        let parsed = cli(&["--config", "/etc/dnr-brief.toml"]);
        assert_eq!(parsed.config, Some(PathBuf::from("/etc/dnr-brief.toml")));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[generation]\nunknown_key = 1").unwrap();
        assert!(FileConfig::load_or_default(f.path()).is_err());
    }

    #[test]
    fn test_debug_output_hides_token() {
        let config = AppConfig::resolve(cli(&["--anthropic-api-key", "sk"]), FileConfig::default()).unwrap();
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("123:ABC"));
        assert!(!dbg.contains("\"sk\""));
    }
}
