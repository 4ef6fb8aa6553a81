//! Google Calendar transport.
//!
//! [`ReqwestTransport`] issues the fetcher's GET requests over `reqwest` with
//! rustls. [`calendar_fetcher`] wires it to a credential provider with the
//! default API base URL.

mod transport;

use std::sync::Arc;
use std::time::Duration;

pub use transport::ReqwestTransport;

use crate::credentials::CredentialProvider;
use crate::error::ProviderResult;
use crate::fetch::WorkingLocationFetcher;

/// Builds a fetcher against the Google Calendar API.
///
/// `timeout` bounds both the HTTP request and the whole fetch.
pub fn calendar_fetcher(
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
) -> ProviderResult<WorkingLocationFetcher> {
    let transport = ReqwestTransport::new(timeout)?;
    Ok(WorkingLocationFetcher::new(Arc::new(transport), credentials).with_timeout(timeout))
}
