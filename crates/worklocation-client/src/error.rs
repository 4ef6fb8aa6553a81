//! Client error types.

use std::fmt;

use worklocation_providers::ProviderError;
use worklocation_server::ServerError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Provider error.
    Provider(String),
    /// IO error.
    Io(std::io::Error),
    /// The credential was rejected; re-authorization is needed.
    AuthRequired(String),
    /// The calendar could not be polled.
    Unavailable(String),
}

impl ClientError {
    /// Returns a hint for the user, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AuthRequired(_) => Some(
                "refresh the token file or set [auth] access_token in config.toml, then retry",
            ),
            Self::Unavailable(_) => Some("the calendar API could not be reached, retry later"),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::AuthRequired(msg) => write!(f, "authentication required: {}", msg),
            Self::Unavailable(msg) => write!(f, "working location unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        if err.is_auth() {
            Self::AuthRequired(err.to_string())
        } else {
            Self::Provider(err.to_string())
        }
    }
}

impl From<ServerError> for ClientError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::AuthFailed(e) => Self::AuthRequired(e.to_string()),
            ServerError::NotReady(e) | ServerError::UpdateFailed(e) => {
                Self::Unavailable(e.to_string())
            }
            ServerError::Config { message } => Self::Config(message),
        }
    }
}
