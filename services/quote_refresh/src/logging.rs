//! Standardized emoji logging for the quote refresh engine
//!
//! Keeps emoji usage consistent across engine, provider and binary logs.

use anyhow::Result;
use quote_config::GlobalConfig;
use tracing_subscriber::EnvFilter;

/// Standard emoji set for quote refresh logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Operation succeeded
    pub const ERROR: &'static str = "❌"; // Operation failed
    pub const WARNING: &'static str = "⚠️"; // Warning or caution

    // Module-specific
    pub const FETCH: &'static str = "📡"; // Provider request issued
    pub const CLOCK: &'static str = "⏱️"; // Debounce timer
    pub const SKIP: &'static str = "⏭️"; // Superseded / ignored outcome
    pub const CHART: &'static str = "📊"; // Quotes / metrics
}

// Convenience macros for standardized logging
#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::WARNING, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_fetch {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::FETCH, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debounce {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::CLOCK, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_skip {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::SKIP, format!($($arg)*))
    };
}

/// Install the global subscriber on stderr. `RUST_LOG` wins over the configured level.
pub fn init_tracing(global: &GlobalConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&global.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if global.json_logs {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
    }
}
