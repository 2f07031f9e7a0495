//! Service Configuration Module
//!
//! Provides configuration loading for the quote refresh service.
//! Supports loading from TOML files with environment-specific overrides
//! and `QUOTE_`-prefixed environment variables (`QUOTE_PROVIDER__BASE_URL`).

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::service;

/// Default location of the base configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/quote_refresh.toml";

/// Main service configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Global settings
    pub global: GlobalConfig,

    /// Refresh engine tuning
    pub engine: EngineSettings,

    /// Quote provider connection
    pub provider: ProviderSettings,
}

/// Global configuration settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
    /// Emit logs as JSON lines instead of the human formatter
    pub json_logs: bool,
}

/// Refresh engine settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub debounce_ms: u64,
}

/// Quote provider settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProviderSettings {
    /// Aggregator base URL; no URL means the binary runs with the demo provider
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub api_key: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: service::logging::DEFAULT_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            debounce_ms: service::refresh::DEBOUNCE_MS,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: service::provider::REQUEST_TIMEOUT_MS,
            api_key: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from files with environment overrides
    ///
    /// An explicit `base_path` must exist; the default path is optional so the
    /// service can start on defaults alone.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let mut builder = match base_path {
            Some(path) => Config::builder().add_source(File::from(path).required(true)),
            None => Config::builder()
                .add_source(File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false)),
        };

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = PathBuf::from("config/environments").join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (QUOTE_ prefix, __ between levels)
        builder = builder.add_source(
            Environment::with_prefix("QUOTE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Expand environment variables in string values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(url) = &self.provider.base_url {
            let expanded = shellexpand::env(url).context("Failed to expand provider base URL")?;
            self.provider.base_url = Some(expanded.to_string());
        }

        if let Some(key) = &self.provider.api_key {
            let expanded = shellexpand::env(key).context("Failed to expand provider API key")?;
            self.provider.api_key = Some(expanded.to_string());
        }

        Ok(())
    }

    /// Effective configuration as TOML, with the API key redacted
    pub fn to_toml(&self) -> Result<String> {
        let mut printable = self.clone();
        if printable.provider.api_key.is_some() {
            printable.provider.api_key = Some("<redacted>".to_string());
        }
        toml::to_string_pretty(&printable).context("Failed to serialize configuration")
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>, environment: Option<&str>) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load(path, environment)?;
    config.expand_env_vars()?;
    Ok(config)
}
