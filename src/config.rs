//! `~/.config/calbulk/config.toml`, overridable with `CALBULK_*` env vars
//! (`CALBULK_ENGINE__CONCURRENCY=4`, `CALBULK_GOOGLE__CALENDAR_ID=...`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calbulk_core::EngineConfig;
use calbulk_provider_google::GoogleConfig;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub google: GoogleConfig,
}

impl CliConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("calbulk")
            .join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config");

        let config: CliConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CALBULK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        config
            .engine
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        Ok(config)
    }
}
