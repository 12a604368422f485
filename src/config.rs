//! Application configuration.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Where flavor facts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FactProvider {
    /// Google Gemini.
    Gemini,
    /// OpenAI.
    OpenAI,
    /// Anthropic.
    Anthropic,
    /// Built-in fallback text, no network.
    Offline,
}

impl FactProvider {
    /// The LLM backend behind this provider, if it uses one.
    pub fn llm_provider(self) -> Option<LlmProvider> {
        match self {
            FactProvider::Gemini => Some(LlmProvider::Gemini),
            FactProvider::OpenAI => Some(LlmProvider::OpenAI),
            FactProvider::Anthropic => Some(LlmProvider::Anthropic),
            FactProvider::Offline => None,
        }
    }
}

/// Runtime settings for the game binary.
///
/// Game rules are not configurable here; see [`crate::GameRules`].
#[derive(Debug, Clone, Getters, Deserialize)]
pub struct AppConfig {
    /// SQLite file holding the high score (`:memory:` keeps it in-process).
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Fact source.
    #[serde(default = "default_fact_provider")]
    fact_provider: FactProvider,

    /// Model name; each provider has its own default.
    #[serde(default)]
    fact_model: Option<String>,

    /// Maximum tokens per fact response.
    #[serde(default = "default_max_tokens")]
    fact_max_tokens: u32,
}

#[instrument]
fn default_db_path() -> String {
    "flag_quest.db".to_string()
}

#[instrument]
fn default_fact_provider() -> FactProvider {
    FactProvider::Gemini
}

#[instrument]
fn default_max_tokens() -> u32 {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            fact_provider: default_fact_provider(),
            fact_model: None,
            fact_max_tokens: default_max_tokens(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(provider = %config.fact_provider, db_path = %config.db_path, "Config loaded successfully");
        Ok(config)
    }

    /// Loads configuration from `path` if it exists, otherwise uses defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the database path.
    #[instrument(skip(self))]
    pub fn set_db_path(&mut self, db_path: String) {
        self.db_path = db_path;
    }

    /// Overrides the fact provider.
    #[instrument(skip(self))]
    pub fn set_fact_provider(&mut self, provider: FactProvider) {
        self.fact_provider = provider;
    }

    /// Creates the LLM configuration for the chosen provider.
    ///
    /// Returns `Ok(None)` for the offline provider. Requires the provider's
    /// API key environment variable otherwise.
    #[instrument(skip(self), fields(provider = %self.fact_provider))]
    pub fn create_llm_config(&self) -> Result<Option<LlmConfig>, ConfigError> {
        let Some(provider) = self.fact_provider.llm_provider() else {
            debug!("Offline provider, no LLM config");
            return Ok(None);
        };

        let var = provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;

        let model = self
            .fact_model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());

        Ok(Some(LlmConfig::new(
            provider,
            api_key,
            model,
            self.fact_max_tokens,
        )))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
