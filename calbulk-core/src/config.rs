//! Engine tuning knobs.
//!
//! Deserialized from the `[engine]` table of `~/.config/calbulk/config.toml`;
//! every field has a calibrated default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BulkError, BulkResult};

/// Concurrent in-flight mutations per wave.
pub const DEFAULT_CONCURRENCY: usize = 12;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.5;
pub const DEFAULT_RATE_LIMIT_MULTIPLIER: f64 = 2.0;
/// Largest accepted `retry.max_attempts`.
pub const MAX_ATTEMPTS_LIMIT: u32 = 100;

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

fn default_backoff_factor() -> f64 {
    DEFAULT_BACKOFF_FACTOR
}

fn default_rate_limit_multiplier() -> f64 {
    DEFAULT_RATE_LIMIT_MULTIPLIER
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_rate_limit_multiplier")]
    pub rate_limit_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            rate_limit_multiplier: DEFAULT_RATE_LIMIT_MULTIPLIER,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn validate(&self) -> BulkResult<()> {
        if !(1..=MAX_ATTEMPTS_LIMIT).contains(&self.max_attempts) {
            return Err(BulkError::Config(format!(
                "retry.max_attempts must be between 1 and {}, got {}",
                MAX_ATTEMPTS_LIMIT, self.max_attempts
            )));
        }
        if !(self.backoff_factor.is_finite() && self.backoff_factor >= 1.0) {
            return Err(BulkError::Config(format!(
                "retry.backoff_factor must be at least 1.0, got {}",
                self.backoff_factor
            )));
        }
        if !(self.rate_limit_multiplier.is_finite() && self.rate_limit_multiplier >= 0.0) {
            return Err(BulkError::Config(format!(
                "retry.rate_limit_multiplier must be at least 0.0, got {}",
                self.rate_limit_multiplier
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Where the last undo record is kept. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryConfig::default(),
            undo_path: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> BulkResult<()> {
        self.retry.validate()
    }

    /// Wave width, never below one.
    pub fn wave_width(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn undo_path(&self) -> BulkResult<PathBuf> {
        if let Some(path) = &self.undo_path {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            return Ok(PathBuf::from(expanded));
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| BulkError::Config("Could not determine data directory".into()))?;

        Ok(data_dir.join("calbulk").join("last_action.json"))
    }
}
