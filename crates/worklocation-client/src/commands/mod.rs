//! Subcommand implementations.

pub mod config;
pub mod status;
pub mod watch;

use worklocation_providers::google;
use worklocation_server::WorkingLocationCoordinator;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Builds a coordinator for the configured calendar.
pub fn build_coordinator(config: &ClientConfig) -> ClientResult<WorkingLocationCoordinator> {
    let credentials = config
        .auth
        .credential_provider()
        .map_err(ClientError::Config)?;
    let fetcher = google::calendar_fetcher(credentials, config.timeout())?;
    Ok(WorkingLocationCoordinator::new(fetcher, config.calendar.clone())?)
}

