//! Service configuration defaults
//!
//! This module contains default configuration values and constants
//! used across the quote refresh service for consistency.

/// Refresh engine defaults
pub mod refresh {
    /// Quiescence window after the last input change before a fetch (milliseconds)
    pub const DEBOUNCE_MS: u64 = 750;

    /// Error tag recorded when the provider answers with zero candidates
    pub const ALL_ROUTES_FAILED: &str = "all routes failed";
}

/// Quote provider defaults
pub mod provider {
    /// HTTP request timeout (milliseconds)
    pub const REQUEST_TIMEOUT_MS: u64 = 15_000;

    /// Idle connection lifetime in the HTTP pool (seconds)
    pub const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

    /// Idle connections kept per host
    pub const POOL_MAX_IDLE_PER_HOST: usize = 4;

    /// Path template for aggregated quotes; `{chain_id}` is substituted
    pub const QUOTES_PATH: &str = "/v1/swap/networks/{chain_id}/quotes";
}

/// Logging defaults
pub mod logging {
    /// Default `EnvFilter` directive when `RUST_LOG` is not set
    pub const DEFAULT_LEVEL: &str = "info";
}
