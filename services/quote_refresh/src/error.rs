//! Error types for the quote refresh engine

use quote_config::service::refresh::ALL_ROUTES_FAILED;
use thiserror::Error;

/// Error tag recorded in the refresh state and exposed verbatim to callers.
///
/// A tag may coexist with a non-empty candidate list: the list is the last
/// good result, the tag describes the most recent fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// Provider answered successfully but no route produced a quote
    #[error("{}", ALL_ROUTES_FAILED)]
    AllRoutesFailed,

    /// Provider call itself failed (network, timeout, internal)
    #[error("provider failure: {0}")]
    ProviderFailure(String),
}

/// Errors returned by a quote provider.
///
/// The engine collapses all of these into [`RefreshError::ProviderFailure`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider rejected request: {0}")]
    Rejected(String),
}

/// Errors from the engine handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("refresh engine has stopped")]
    Stopped,
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl From<&ProviderError> for RefreshError {
    fn from(err: &ProviderError) -> Self {
        RefreshError::ProviderFailure(err.to_string())
    }
}
