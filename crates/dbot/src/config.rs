//! Application configuration loaded from an optional file and environment
//! variables.

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub discord: DiscordConfig,

    /// OpenAI configuration; LLM commands are only registered with an API key.
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enable: bool,

    /// Bot API token
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Bot API endpoint
    #[serde(default = "default_telegram_url")]
    pub api_url: String,

    /// Long-poll timeout for getUpdates
    #[serde(default = "default_poll_timeout", with = "humantime_serde")]
    pub poll_timeout: Duration,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub enable: bool,

    /// Bot token
    #[serde(default)]
    pub token: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_openai_url")]
    pub base_url: String,

    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Request timeout
    #[serde(default = "default_openai_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    /// Upper bound for a single command invocation
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Timeout for joke, dog, tracking and media requests
    #[serde(default = "default_http_timeout", with = "humantime_serde")]
    pub http_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Appends beyond this many records fail
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// JSON-lines journal; in-memory only when unset
    #[serde(default)]
    pub journal_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enable: false,
            token: None,
            api_url: default_telegram_url(),
            poll_timeout: default_poll_timeout(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_url(),
            model: default_model(),
            image_model: default_image_model(),
            timeout: default_openai_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            timeout: default_command_timeout(),
            http_timeout: default_http_timeout(),
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            journal_path: None,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// Default value functions
fn default_telegram_url() -> String {
    "https://api.telegram.org".into()
}

fn default_poll_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_image_model() -> String {
    "dall-e-2".into()
}

fn default_openai_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(90)
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_max_records() -> usize {
    100_000
}

fn default_log_level() -> String {
    "info".into()
}

/// A token that is present and not blank.
pub fn usable_token(token: Option<&SecretString>) -> Option<&str> {
    token
        .map(|t| t.expose_secret().as_str())
        .filter(|t| !t.trim().is_empty())
}

impl Config {
    /// Load configuration from `dbot.{toml,json,yaml}` (optional) and the
    /// environment, e.g. `TELEGRAM__TOKEN`, `OPENAI__API_KEY`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("dbot").required(false))
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep tokens like 123:abc as strings.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
