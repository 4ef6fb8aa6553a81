//! Host-side collaborator for the working-location core.
//!
//! This crate provides what the fetcher and resolver leave to their host:
//! - [`WorkingLocationCoordinator`] - runs fetch-then-resolve cycles and keeps
//!   the last good status
//! - [`SensorView`] - the state, attributes and availability shown to users
//! - [`Scheduler`] - eager first poll, periodic polls with jitter, backoff
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use worklocation_server::{Scheduler, WorkingLocationCoordinator};
//!
//! let coordinator = Arc::new(WorkingLocationCoordinator::new(fetcher, options)?);
//! let scheduler = Scheduler::new(coordinator.scheduler_config());
//! let reason = coordinator.run(scheduler).await;
//! ```

mod coordinator;
mod error;
mod scheduler;

pub use coordinator::{
    SensorState, SensorView, SharedSensorState, WorkingLocationCoordinator, local_now,
};
pub use error::{ServerError, ServerResult};
pub use scheduler::{
    Scheduler, SchedulerCommand, SchedulerConfig, SchedulerHandle, SchedulerState,
    SharedSchedulerState, StopReason, new_scheduler_state,
};
