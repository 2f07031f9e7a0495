//! # Quote Refresh Centralized Configuration
//!
//! This crate provides centralized configuration management and defaults
//! for the quote refresh service, eliminating magic numbers in the engine.
//!
//! ## Features
//!
//! - **Service Defaults**: debounce window, provider timeouts, log level
//! - **Layered Loading**: TOML file, optional environment file, then
//!   `QUOTE_`-prefixed environment variables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quote_config::{load_config, service};
//!
//! let config = load_config(None, Some("production")).unwrap();
//! println!("debounce: {}ms (default {}ms)", config.engine.debounce_ms, service::refresh::DEBOUNCE_MS);
//! ```

pub mod service;
pub mod service_config;

// Re-export commonly used types
pub use service_config::{
    load_config, EngineSettings, GlobalConfig, ProviderSettings, ServiceConfig,
};
