//! HTTP collaborator used by the fetcher.
//!
//! The fetcher never talks to the network directly. It hands an
//! [`ApiRequest`] to an [`HttpTransport`], which returns the status code and
//! body or a transport-level [`ProviderError`]. The Google implementation lives
//! in [`crate::google`]; tests substitute an in-memory transport.

use std::future::Future;
use std::pin::Pin;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the collaborator traits object-safe so they can be
/// stored as `Arc<dyn ...>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single authenticated GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters in the order they should be sent.
    pub query: Vec<(String, String)>,
    /// OAuth bearer token.
    pub bearer_token: String,
}

impl ApiRequest {
    /// Creates a request for a URL.
    pub fn get(url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            bearer_token: bearer_token.into(),
        }
    }

    /// Builder: append a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Returns the first value of a query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, expected to be JSON.
    pub body: String,
}

impl ApiResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues HTTP requests on behalf of the fetcher.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; classification of statuses is the fetcher's job. Network failures
/// are returned as transient [`ProviderError`](crate::ProviderError)s.
pub trait HttpTransport: Send + Sync {
    /// Performs a GET request.
    fn get(&self, request: ApiRequest) -> BoxFuture<'_, ProviderResult<ApiResponse>>;
}
