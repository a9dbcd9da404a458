//! Configuration handling for the summarizer collaborator.
//!
//! Settings come from environment variables with development defaults.
//! `Config::from_env` validates what it can (the base URL must parse) and
//! leaves the rest to the summarizer, which reports a missing API key as
//! "not configured".

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

use url::Url;

/// Environment variable names.
pub const ENV_LLM_ENABLED: &str = "DIGEST_LLM_ENABLED";
pub const ENV_LLM_BASE_URL: &str = "DIGEST_LLM_BASE_URL";
pub const ENV_LLM_API_KEY: &str = "DIGEST_LLM_API_KEY";
pub const ENV_LLM_MODEL: &str = "DIGEST_LLM_MODEL";

const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Runtime configuration for summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    enabled: bool,
    base_url: String,
    api_key: String,
    model: String,
}

impl Config {
    pub fn new(
        enabled: bool,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            enabled,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let enabled = match env::var(ENV_LLM_ENABLED) {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                field: ENV_LLM_ENABLED,
                reason: format!("expected true/false, got '{}'", raw),
            })?,
            Err(_) => true,
        };

        let base_url =
            env::var(ENV_LLM_BASE_URL).unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string());
        Url::parse(&base_url).map_err(|e| ConfigError::InvalidValue {
            field: ENV_LLM_BASE_URL,
            reason: e.to_string(),
        })?;

        let api_key = env::var(ENV_LLM_API_KEY).unwrap_or_default();
        let model = env::var(ENV_LLM_MODEL).unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());

        Ok(Self {
            enabled,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
    /// OpenAI-compatible API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
    pub fn model(&self) -> &str {
        &self.model
    }

    /// True when a summarization request can be attempted at all.
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(true, DEFAULT_LLM_BASE_URL, "", DEFAULT_LLM_MODEL)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
