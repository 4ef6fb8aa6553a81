//! Periodic poll scheduler.
//!
//! Runs one poll eagerly at startup, then every update interval with jitter.
//! Failed polls switch to exponential backoff until one succeeds; a fatal
//! failure (see [`ServerError::is_fatal`]) ends the loop so the host can
//! re-authorize. Polls run inline in the loop, so at most one is in flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info, warn};

use crate::error::ServerError;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Base interval between polls.
    pub poll_interval: Duration,
    /// Maximum jitter to add to the interval (as fraction 0.0-1.0).
    pub jitter_fraction: f64,
    /// Initial backoff duration on error.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            jitter_fraction: 0.1,
            initial_backoff: Duration::from_secs(15),
            max_backoff: Duration::from_secs(300),
            backoff_multiplier: 2.0,
        }
    }
}

impl SchedulerConfig {
    /// Creates a config with the given poll interval.
    ///
    /// Backoff never waits longer than one interval.
    pub fn new(poll_interval: Duration) -> Self {
        let defaults = Self::default();
        Self {
            poll_interval,
            max_backoff: poll_interval,
            initial_backoff: defaults.initial_backoff.min(poll_interval),
            ..defaults
        }
    }

    /// Builder: set jitter fraction.
    pub fn with_jitter(mut self, fraction: f64) -> Self {
        self.jitter_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Builder: set backoff parameters.
    pub fn with_backoff(mut self, initial: Duration, max: Duration, multiplier: f64) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the next poll delay with jitter.
    pub fn next_poll_delay(&self) -> Duration {
        let base = self.poll_interval.as_secs_f64();
        let jitter = rand_jitter(base * self.jitter_fraction);
        Duration::from_secs_f64((base + jitter).max(0.0))
    }

    /// Calculates backoff delay based on consecutive failures.
    pub fn backoff_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(consecutive_failures - 1).unwrap_or(i32::MAX);
        let delay = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(delay.min(self.max_backoff.as_secs_f64()))
    }
}

/// Time-seeded jitter in [-range, range].
fn rand_jitter(range: f64) -> f64 {
    use std::time::SystemTime;

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();

    let fraction = f64::from(nanos) / 1_000_000_000.0;
    (fraction * 2.0 - 1.0) * range
}

/// Commands that can be sent to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Poll immediately.
    SyncNow,
    /// Skip timed polls until resumed.
    Pause,
    /// Resume timed polls.
    Resume,
    /// Stop the scheduler.
    Stop,
}

/// Why the scheduler loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A stop command was received.
    Stopped,
    /// A poll failed in a way retrying cannot fix.
    Fatal(String),
}

/// Scheduler state.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Whether timed polls are paused.
    pub paused: bool,
    /// Number of consecutive poll failures.
    pub consecutive_failures: u32,
    /// Total polls attempted.
    pub polls: u64,
    /// Last successful poll time.
    pub last_sync: Option<DateTime<Utc>>,
    /// Last poll attempt time.
    pub last_attempt: Option<DateTime<Utc>>,
    /// Last error message.
    pub last_error: Option<String>,
}

impl SchedulerState {
    /// Creates a new scheduler state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful poll.
    pub fn record_success(&mut self) {
        self.polls += 1;
        self.consecutive_failures = 0;
        self.last_sync = Some(Utc::now());
        self.last_attempt = self.last_sync;
        self.last_error = None;
    }

    /// Records a failed poll.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.polls += 1;
        self.consecutive_failures += 1;
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.into());
    }
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Creates a new shared scheduler state.
pub fn new_scheduler_state() -> SharedSchedulerState {
    Arc::new(RwLock::new(SchedulerState::new()))
}

/// Drives periodic polls.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl Scheduler {
    /// Creates a new scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        Self {
            config,
            state: new_scheduler_state(),
            command_tx,
            command_rx,
        }
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// Returns the shared state.
    pub fn state(&self) -> SharedSchedulerState {
        self.state.clone()
    }

    /// Runs the loop until stopped or a poll fails fatally.
    pub async fn run<F, Fut>(self, sync_fn: F) -> StopReason
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServerError>> + Send,
    {
        // Holding our own sender keeps the channel open without any handle.
        let Self {
            config,
            state,
            command_tx: _command_tx,
            mut command_rx,
        } = self;

        info!(
            interval_secs = config.poll_interval.as_secs(),
            "Scheduler started"
        );

        if let Some(reason) = do_sync(&state, &sync_fn).await {
            return reason;
        }

        loop {
            let delay = next_delay(&config, &state).await;
            debug!(delay_secs = delay.as_secs(), "Scheduling next poll");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if state.read().await.paused {
                        debug!("Scheduler paused, skipping poll");
                        continue;
                    }
                    if let Some(reason) = do_sync(&state, &sync_fn).await {
                        return reason;
                    }
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::SyncNow) => {
                            debug!("Received SyncNow command");
                            if let Some(reason) = do_sync(&state, &sync_fn).await {
                                return reason;
                            }
                        }
                        Some(SchedulerCommand::Pause) => {
                            info!("Scheduler paused");
                            state.write().await.paused = true;
                        }
                        Some(SchedulerCommand::Resume) => {
                            info!("Scheduler resumed");
                            state.write().await.paused = false;
                        }
                        Some(SchedulerCommand::Stop) | None => {
                            info!("Scheduler stopping");
                            return StopReason::Stopped;
                        }
                    }
                }
            }
        }
    }
}

async fn next_delay(config: &SchedulerConfig, state: &SharedSchedulerState) -> Duration {
    let failures = state.read().await.consecutive_failures;
    if failures > 0 {
        let backoff = config.backoff_delay(failures);
        debug!(
            failures,
            backoff_secs = backoff.as_secs(),
            "Using backoff delay"
        );
        return backoff;
    }
    config.next_poll_delay()
}

/// Runs one poll; returns a stop reason if the loop must end.
async fn do_sync<F, Fut>(state: &SharedSchedulerState, sync_fn: &F) -> Option<StopReason>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), ServerError>>,
{
    debug!("Starting poll");
    match sync_fn().await {
        Ok(()) => {
            debug!("Poll completed successfully");
            state.write().await.record_success();
            None
        }
        Err(e) if e.is_fatal() => {
            error!(error = %e, "Poll failed fatally, stopping scheduler");
            state.write().await.record_failure(e.to_string());
            Some(StopReason::Fatal(e.to_string()))
        }
        Err(e) => {
            warn!(error = %e, "Poll failed");
            state.write().await.record_failure(e.to_string());
            None
        }
    }
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    /// Triggers an immediate poll.
    pub async fn sync_now(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::SyncNow).await
    }

    /// Pauses timed polls.
    pub async fn pause(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Pause).await
    }

    /// Resumes timed polls.
    pub async fn resume(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Resume).await
    }

    /// Stops the scheduler.
    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Stop).await
    }

    /// Returns a snapshot of the scheduler state.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }

    /// Returns true if the scheduler is paused.
    pub async fn is_paused(&self) -> bool {
        self.state.read().await.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use worklocation_providers::ProviderError;

    #[test]
    fn config_from_interval_caps_backoff() {
        let config = SchedulerConfig::new(Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.max_backoff, Duration::from_secs(60));
        assert_eq!(config.initial_backoff, Duration::from_secs(15));

        let config = SchedulerConfig::new(Duration::from_secs(5));
        assert_eq!(config.initial_backoff, Duration::from_secs(5));
    }

    #[test]
    fn config_next_poll_delay() {
        let config = SchedulerConfig::new(Duration::from_secs(60)).with_jitter(0.1);

        let delay = config.next_poll_delay();
        assert!(delay.as_secs_f64() >= 54.0);
        assert!(delay.as_secs_f64() <= 66.0);
    }

    #[test]
    fn config_backoff_delay() {
        let config = SchedulerConfig::default().with_backoff(
            Duration::from_secs(5),
            Duration::from_secs(300),
            2.0,
        );

        assert_eq!(config.backoff_delay(0), Duration::ZERO);
        assert_eq!(config.backoff_delay(1), Duration::from_secs(5));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(10));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(20));
        assert_eq!(config.backoff_delay(10), Duration::from_secs(300));
    }

    #[test]
    fn state_records() {
        let mut state = SchedulerState::new();

        state.record_failure("boom");
        assert_eq!(state.consecutive_failures, 1);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
        assert!(state.last_sync.is_none());

        state.record_success();
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.polls, 2);
        assert!(state.last_sync.is_some());
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn scheduler_commands() {
        let scheduler = Scheduler::new(SchedulerConfig::new(Duration::from_secs(60)));
        let handle = scheduler.handle();

        let sync_count = Arc::new(AtomicU32::new(0));
        let sync_count_clone = sync_count.clone();

        let scheduler_task = tokio::spawn(async move {
            scheduler
                .run(move || {
                    let count = sync_count_clone.clone();
                    async move {
                        count.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .await
        });

        // Eager first poll
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sync_count.load(Ordering::SeqCst), 1);

        handle.sync_now().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sync_count.load(Ordering::SeqCst), 2);

        handle.pause().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_paused().await);

        handle.resume().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_paused().await);

        handle.stop().await.unwrap();
        assert_eq!(scheduler_task.await.unwrap(), StopReason::Stopped);
    }

    #[tokio::test]
    async fn scheduler_backs_off_and_recovers() {
        let config = SchedulerConfig::new(Duration::from_secs(60)).with_backoff(
            Duration::from_millis(10),
            Duration::from_millis(40),
            2.0,
        );

        let scheduler = Scheduler::new(config);
        let handle = scheduler.handle();

        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let scheduler_task = tokio::spawn(async move {
            scheduler
                .run(move || {
                    let count = attempts_clone.clone();
                    async move {
                        let n = count.fetch_add(1, Ordering::SeqCst);
                        if n < 3 {
                            Err(ServerError::UpdateFailed(ProviderError::transient(format!(
                                "failure {}",
                                n
                            ))))
                        } else {
                            Ok(())
                        }
                    }
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(300)).await;

        // Recovered after three failures, then waits a full interval.
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        let state = handle.state().await;
        assert_eq!(state.consecutive_failures, 0);
        assert!(state.last_sync.is_some());

        handle.stop().await.unwrap();
        scheduler_task.await.unwrap();
    }

    #[tokio::test]
    async fn fatal_failure_stops_loop() {
        let scheduler = Scheduler::new(SchedulerConfig::new(Duration::from_secs(60)));
        let handle = scheduler.handle();

        let reason = scheduler
            .run(|| async {
                Err(ServerError::AuthFailed(ProviderError::authentication(
                    "token expired",
                )))
            })
            .await;

        assert!(matches!(reason, StopReason::Fatal(ref msg) if msg.contains("token expired")));
        let state = handle.state().await;
        assert_eq!(state.consecutive_failures, 1);
    }

    #[tokio::test]
    async fn runs_periodically_without_handle() {
        let config = SchedulerConfig::new(Duration::from_millis(20)).with_jitter(0.0);
        let scheduler = Scheduler::new(config);

        let polls = Arc::new(AtomicU32::new(0));
        let polls_clone = polls.clone();

        let result = tokio::time::timeout(
            Duration::from_millis(300),
            scheduler.run(move || {
                let count = polls_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        )
        .await;

        // Still running when the timeout fires.
        assert!(result.is_err());
        assert!(polls.load(Ordering::SeqCst) >= 2);
    }
}
