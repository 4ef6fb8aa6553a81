//! Poll coordinator and sensor state.
//!
//! The coordinator runs one fetch-then-resolve cycle per call and owns the
//! last good [`ResolvedStatus`]. Failed polls never touch that snapshot: they
//! only flip availability, so a transient outage keeps the previous state on
//! display while marking it stale.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use worklocation_core::{Attributes, ResolvedStatus, WorkingLocationOptions};
use worklocation_providers::{
    ProviderError, ProviderErrorCode, ProviderResult, WorkingLocationFetcher, resolve,
};

use crate::error::{ServerError, ServerResult};
use crate::scheduler::{Scheduler, SchedulerConfig, StopReason};

/// What the host knows about the sensor between polls.
#[derive(Debug, Clone, Default)]
pub struct SensorState {
    /// Most recent successfully resolved status.
    pub last_good: Option<ResolvedStatus>,
    /// Whether the most recent poll succeeded.
    pub last_update_success: bool,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
    /// When the snapshot was last replaced.
    pub last_success_at: Option<DateTime<Utc>>,
}

impl SensorState {
    fn record_success(&mut self, status: ResolvedStatus, at: DateTime<Utc>) {
        self.last_good = Some(status);
        self.last_update_success = true;
        self.last_error = None;
        self.last_success_at = Some(at);
    }

    fn record_failure(&mut self, error: &ProviderError) {
        self.last_update_success = false;
        self.last_error = Some(error.to_string());
    }

    /// Returns the presentation view of this state.
    pub fn view(&self) -> SensorView {
        match &self.last_good {
            Some(status) => SensorView {
                state: Some(status.state_str().to_string()),
                attributes: status.attributes.clone(),
                available: self.last_update_success,
            },
            None => SensorView {
                state: None,
                attributes: Attributes::new(),
                available: false,
            },
        }
    }
}

/// Shared sensor state.
pub type SharedSensorState = Arc<RwLock<SensorState>>;

/// What the presentation layer shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorView {
    /// State string, or `None` before the first successful poll.
    pub state: Option<String>,
    /// Attributes of the last good status.
    pub attributes: Attributes,
    /// False when the last poll failed or nothing was ever fetched.
    pub available: bool,
}

/// Drives polls for one configured calendar.
pub struct WorkingLocationCoordinator {
    fetcher: WorkingLocationFetcher,
    options: WorkingLocationOptions,
    state: SharedSensorState,
}

impl WorkingLocationCoordinator {
    /// Creates a coordinator after validating the options.
    pub fn new(
        fetcher: WorkingLocationFetcher,
        options: WorkingLocationOptions,
    ) -> ServerResult<Self> {
        options.validate()?;
        Ok(Self {
            fetcher,
            options,
            state: Arc::new(RwLock::new(SensorState::default())),
        })
    }

    /// Returns the options in use.
    pub fn options(&self) -> &WorkingLocationOptions {
        &self.options
    }

    /// Returns the shared sensor state.
    pub fn state(&self) -> SharedSensorState {
        self.state.clone()
    }

    /// Fetches and resolves without touching the sensor state.
    pub async fn poll(
        &self,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> ProviderResult<ResolvedStatus> {
        let calendar_id = self.options.calendar_id.as_str();
        let events = self.fetcher.fetch(calendar_id, now, offset).await?;
        Ok(resolve(&events, now, calendar_id, self.options.none_outside_hours))
    }

    /// Runs the setup poll.
    ///
    /// # Errors
    ///
    /// [`ServerError::AuthFailed`] if the credential is invalid, otherwise
    /// [`ServerError::NotReady`] so the host retries setup later.
    pub async fn first_refresh(
        &self,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> ServerResult<ResolvedStatus> {
        self.refresh_with(now, offset, ServerError::NotReady).await
    }

    /// Runs a steady-state poll.
    ///
    /// # Errors
    ///
    /// [`ServerError::AuthFailed`] if the credential is invalid, otherwise
    /// [`ServerError::UpdateFailed`]. Either way the last good status is kept
    /// and the sensor is marked unavailable.
    pub async fn refresh(
        &self,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> ServerResult<ResolvedStatus> {
        self.refresh_with(now, offset, ServerError::UpdateFailed).await
    }

    /// Runs a steady-state poll at the current local time.
    pub async fn refresh_now(&self) -> ServerResult<ResolvedStatus> {
        let (now, offset) = local_now();
        self.refresh(now, offset).await
    }

    /// Returns the presentation view.
    pub async fn sensor(&self) -> SensorView {
        self.state.read().await.view()
    }

    async fn refresh_with(
        &self,
        now: DateTime<Utc>,
        offset: FixedOffset,
        on_failure: fn(ProviderError) -> ServerError,
    ) -> ServerResult<ResolvedStatus> {
        let calendar_id = self.options.calendar_id.as_str();

        match self.poll(now, offset).await {
            Ok(status) => {
                let mut state = self.state.write().await;
                let previous = state.last_good.as_ref().map(|s| s.state);
                if previous != Some(status.state) {
                    info!(
                        calendar_id,
                        state = %status.state,
                        previous = previous.map(|s| s.as_str()).unwrap_or("<none>"),
                        "working location changed"
                    );
                }
                state.record_success(status.clone(), now);
                Ok(status)
            }
            Err(e) => {
                self.state.write().await.record_failure(&e);
                match e.code() {
                    ProviderErrorCode::AuthenticationFailed => {
                        error!(calendar_id, error = %e, "calendar credential rejected");
                        Err(ServerError::AuthFailed(e))
                    }
                    ProviderErrorCode::ConfigurationError => {
                        error!(calendar_id, error = %e, "calendar source misconfigured");
                        Err(ServerError::config(e.to_string()))
                    }
                    ProviderErrorCode::Transient | ProviderErrorCode::MalformedData => {
                        warn!(calendar_id, error = %e, "working location poll failed");
                        Err(on_failure(e))
                    }
                }
            }
        }
    }

    /// Polls on `scheduler` until it stops.
    ///
    /// The scheduler's eager first poll is a steady-state refresh; run
    /// [`first_refresh`](Self::first_refresh) beforehand for setup semantics.
    pub async fn run(self: Arc<Self>, scheduler: Scheduler) -> StopReason {
        scheduler
            .run(move || {
                let coordinator = self.clone();
                async move { coordinator.refresh_now().await.map(|_| ()) }
            })
            .await
    }

    /// Scheduler config derived from the update interval.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(self.options.update_interval())
    }
}

/// Returns the current instant and the local UTC offset.
pub fn local_now() -> (DateTime<Utc>, FixedOffset) {
    let local = Local::now();
    (local.with_timezone(&Utc), local.offset().fix())
}
