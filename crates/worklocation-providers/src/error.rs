//! Error types for working-location fetches.
//!
//! Every failure the fetcher can see is folded into one of a small set of
//! classes so the host can decide between re-authorizing, keeping the last
//! good status, or reporting bad data.

use std::fmt;
use thiserror::Error;

/// The class of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// HTTP 401, or the credential is permanently invalid.
    AuthenticationFailed,
    /// Any other HTTP error status, a network failure, or a timeout.
    Transient,
    /// The top-level response could not be understood at all.
    MalformedData,
    /// The fetcher or a collaborator was configured incorrectly.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Returns true if the caller should keep its last good status and retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient)
    }

    /// Returns a stable name for this error class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "auth_error",
            Self::Transient => "transient_error",
            Self::MalformedData => "malformed_data_error",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while fetching working-location events.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The provider that generated this error (e.g. "google").
    provider: Option<String>,
    /// HTTP status, when the error came from a response.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            status: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Transient, message)
    }

    /// Creates a timeout error (transient).
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::transient(message)
    }

    /// Classifies a non-2xx HTTP status.
    ///
    /// 401 is an authentication failure; every other status is transient.
    pub fn from_status(status: u16, body: &str) -> Self {
        let err = if status == 401 {
            Self::authentication("access token expired or invalid")
        } else if body.is_empty() {
            Self::transient(format!("API error ({})", status))
        } else {
            Self::transient(format!("API error ({}): {}", status, body))
        };
        err.with_status(status)
    }

    /// Creates a malformed data error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::MalformedData, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Records the HTTP status that produced this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns the HTTP status, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true if this error is transient.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Returns true if the credential must be re-authorized.
    pub fn is_auth(&self) -> bool {
        self.code == ProviderErrorCode::AuthenticationFailed
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
