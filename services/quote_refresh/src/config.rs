//! # Refresh Engine Configuration
//!
//! ## Purpose
//!
//! Runtime parameters for one refresh engine instance. Built from the layered
//! [`quote_config::ServiceConfig`] in production, from environment variables
//! for quick experiments, or directly in tests.
//!
//! ## Parameters
//!
//! - **debounce**: quiescence window after the last input change (750 ms)
//! - **provider**: HTTP aggregator endpoint and request timeout

use anyhow::{bail, Context, Result};
use quote_config::{service, ServiceConfig};
use std::time::Duration;
use url::Url;

/// Engine timing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Quiet period required before a burst of changes becomes a fetch
    pub debounce: Duration,
}

/// HTTP quote provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProviderConfig {
    pub base_url: Url,
    /// Per-request timeout; the engine itself never times out a fetch
    pub timeout: Duration,
    pub api_key: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(service::refresh::DEBOUNCE_MS),
        }
    }
}

impl EngineConfig {
    pub fn with_debounce(debounce: Duration) -> Self {
        Self { debounce }
    }

    pub fn from_settings(settings: &ServiceConfig) -> Self {
        Self {
            debounce: Duration::from_millis(settings.engine.debounce_ms),
        }
    }

    /// Defaults with `QUOTE_ENGINE__DEBOUNCE_MS` applied if present and numeric.
    ///
    /// Same variable the layered loader maps onto `engine.debounce_ms`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(debounce) = std::env::var("QUOTE_ENGINE__DEBOUNCE_MS") {
            if let Ok(value) = debounce.parse::<u64>() {
                config.debounce = Duration::from_millis(value);
            }
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce.is_zero() {
            bail!("debounce must be positive");
        }
        if self.debounce > Duration::from_secs(60) {
            bail!("debounce must be at most 60s, got {:?}", self.debounce);
        }
        Ok(())
    }
}

impl HttpProviderConfig {
    /// `Ok(None)` when no base URL is configured
    pub fn from_settings(settings: &ServiceConfig) -> Result<Option<Self>> {
        let Some(raw) = settings.provider.base_url.as_deref() else {
            return Ok(None);
        };

        let base_url = Url::parse(raw).with_context(|| format!("Invalid provider URL '{}'", raw))?;
        let config = Self {
            base_url,
            timeout: Duration::from_millis(settings.provider.timeout_ms),
            api_key: settings.provider.api_key.clone(),
        };
        config.validate()?;
        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<()> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            other => bail!("provider URL scheme must be http or https, got '{}'", other),
        }
        if self.timeout.is_zero() {
            bail!("provider timeout must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = EngineConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(750));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_debounce_is_invalid() {
        assert!(EngineConfig::with_debounce(Duration::ZERO).validate().is_err());
    }

    #[test]
    fn test_from_settings() {
        let mut settings = ServiceConfig::default();
        settings.engine.debounce_ms = 300;
        settings.provider.base_url = Some("https://api.example.org".to_string());
        settings.provider.timeout_ms = 5_000;

        assert_eq!(
            EngineConfig::from_settings(&settings).debounce,
            Duration::from_millis(300)
        );
        let provider = HttpProviderConfig::from_settings(&settings).unwrap().unwrap();
        assert_eq!(provider.base_url.host_str(), Some("api.example.org"));
        assert_eq!(provider.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_provider_is_optional_but_must_be_valid() {
        let mut settings = ServiceConfig::default();
        assert!(HttpProviderConfig::from_settings(&settings).unwrap().is_none());

        settings.provider.base_url = Some("ftp://quotes.example.org".to_string());
        assert!(HttpProviderConfig::from_settings(&settings).is_err());

        settings.provider.base_url = Some("not a url".to_string());
        assert!(HttpProviderConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_env_override_uses_loader_variable() {
        std::env::set_var("QUOTE_DEBOUNCE_MS", "999");
        std::env::set_var("QUOTE_ENGINE__DEBOUNCE_MS", "250");

        let config = EngineConfig::from_env();
        assert_eq!(config.debounce, Duration::from_millis(250));

        std::env::remove_var("QUOTE_ENGINE__DEBOUNCE_MS");
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());

        std::env::remove_var("QUOTE_DEBOUNCE_MS");
    }
}
