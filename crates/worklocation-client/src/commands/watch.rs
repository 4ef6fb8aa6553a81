//! Long-running watch command.

use std::sync::Arc;

use tracing::{info, warn};

use worklocation_server::{Scheduler, StopReason};

use crate::commands::build_coordinator;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Polls on the configured interval until Ctrl-C or an auth failure.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let coordinator = Arc::new(build_coordinator(config)?);
    info!(
        calendar_id = %config.calendar.calendar_id,
        interval_secs = config.calendar.update_interval().as_secs(),
        "watching working location"
    );

    let scheduler = Scheduler::new(coordinator.scheduler_config());
    let handle = scheduler.handle();
    let mut task = tokio::spawn(coordinator.clone().run(scheduler));

    let reason = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, stopping");
            if let Err(e) = handle.stop().await {
                warn!(error = %e, "scheduler already stopped");
            }
            task.await
        }
    }
    .map_err(|e| ClientError::Io(std::io::Error::other(e)))?;

    match reason {
        StopReason::Stopped => Ok(()),
        StopReason::Fatal(message) => Err(ClientError::AuthRequired(message)),
    }
}
