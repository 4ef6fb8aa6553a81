//! Server error types.

use thiserror::Error;
use worklocation_core::OptionsError;
use worklocation_providers::ProviderError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced by the coordinator to its host.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The credential is no longer valid; the host must re-authorize.
    #[error("Authentication failed, re-authorization required: {0}")]
    AuthFailed(#[source] ProviderError),

    /// The first refresh failed transiently; setup should be retried later.
    #[error("Not ready, retry setup later: {0}")]
    NotReady(#[source] ProviderError),

    /// A steady-state refresh failed; the last good status is kept.
    #[error("Update failed: {0}")]
    UpdateFailed(#[source] ProviderError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if retrying without operator action cannot succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthFailed(_) | Self::Config { .. })
    }

    /// Returns true for authentication failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthFailed(_))
    }

    /// Returns the underlying provider error, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::AuthFailed(e) | Self::NotReady(e) | Self::UpdateFailed(e) => Some(e),
            Self::Config { .. } => None,
        }
    }
}

impl From<OptionsError> for ServerError {
    fn from(err: OptionsError) -> Self {
        Self::config(err.to_string())
    }
}
