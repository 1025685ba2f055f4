use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use flashcard_assist::{AssistConfig, AssistService};

/// Shared state for CLI commands
pub struct App {
    pub config: AssistConfig,
}

impl App {
    /// Load configuration from `config_path` (if any) and the environment
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = AssistConfig::load(config_path).context("Failed to load configuration")?;
        Ok(Self { config })
    }

    /// Edit service wired to the configured provider
    pub fn service(&self) -> Result<Arc<AssistService>> {
        let service = AssistService::from_config(&self.config.provider)
            .context("Failed to initialize OpenRouter client")?;
        Ok(Arc::new(service))
    }
}
