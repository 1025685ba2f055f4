//! Service configuration
//!
//! Loaded from an optional TOML file, then overridden from the environment.
//! The provider credential lives here and is handed to the service at
//! construction time; nothing below this layer reads the environment.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the OpenRouter API key
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
/// Environment variable overriding the listen address
pub const BIND_ENV: &str = "FLASHCARD_ASSIST_BIND";

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
}

/// Inbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the edit endpoint listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Chat-completion provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Full chat-completions URL
    pub endpoint: String,
    /// Usually left out of the file and supplied through `OPENROUTER_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sent as `HTTP-Referer` for provider attribution
    pub referrer: String,
    /// Sent as `X-Title` for provider attribution
    pub title: String,
    /// Overall request timeout in seconds (0 disables)
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            referrer: "http://localhost".to_string(),
            title: "Flashcard Assist".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// The configured credential, if a non-blank one is present
    pub fn api_key(&self) -> Option<ApiKey> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| ApiKey(key.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidEndpoint(
                "URL must start with http:// or https://".to_string(),
            ));
        }
        Ok(())
    }
}

/// Provider credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl AssistConfig {
    /// Load from `path` (or defaults) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                log::info!("Loading config from {:?}", path);
                Self::from_toml_str(&fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.provider.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from `lookup`; blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank(API_KEY_ENV) {
            self.provider.api_key = Some(key);
        }
        if let Some(bind) = non_blank(BIND_ENV) {
            self.server.bind = bind;
        }
    }
}
