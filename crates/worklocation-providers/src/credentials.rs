//! Credential providers.
//!
//! A [`CredentialProvider`] is handed to the fetcher at construction time and
//! scoped to one configured source. Token acquisition and refresh happen
//! elsewhere; providers here only read what is already available and report
//! a credential that can no longer be used as an authentication error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::transport::BoxFuture;

/// Supplies bearer tokens for API requests.
pub trait CredentialProvider: Send + Sync {
    /// Returns a currently valid access token.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the credential is permanently
    /// invalid, or a transient error if the backing store is temporarily
    /// unreachable.
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<String>>;
}

/// A fixed bearer token.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    /// Creates a provider for the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").finish_non_exhaustive()
    }
}

impl CredentialProvider for StaticToken {
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(async move {
            if self.token.trim().is_empty() {
                return Err(ProviderError::authentication("access token is empty"));
            }
            Ok(self.token.clone())
        })
    }
}

/// Token data persisted by whatever performed the OAuth flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    pub access_token: String,

    /// When the access token expires.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes that were granted.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenInfo {
    /// Creates token info without an expiry.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
            scopes: Vec::new(),
        }
    }

    /// Builder: set the expiry instant.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if the token is expired at `now`.
    ///
    /// A token without expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Reads the access token from a JSON token file on every request.
///
/// The file is re-read each time so an external refresher can rewrite it
/// between polls.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    /// Creates a provider reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the token at `now`.
    pub fn load_at(&self, now: DateTime<Utc>) -> ProviderResult<TokenInfo> {
        if !self.path.exists() {
            return Err(ProviderError::authentication(format!(
                "no token file at {}",
                self.path.display()
            )));
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::transient(format!("failed to read token file: {}", e)).with_source(e)
        })?;

        let tokens: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::authentication(format!("failed to parse token file: {}", e))
        })?;

        if tokens.access_token.trim().is_empty() {
            return Err(ProviderError::authentication("token file has an empty access token"));
        }

        if tokens.is_expired_at(now) {
            return Err(ProviderError::authentication(
                "access token expired - re-authorization required",
            ));
        }

        debug!(path = %self.path.display(), "loaded access token");
        Ok(tokens)
    }
}

impl CredentialProvider for TokenFile {
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(async move { self.load_at(Utc::now()).map(|tokens| tokens.access_token) })
    }
}
