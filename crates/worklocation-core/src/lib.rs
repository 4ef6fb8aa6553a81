//! Core types: local-day window, location state, attributes, options

pub mod options;
pub mod status;
pub mod time;
pub mod tracing;

pub use options::{OptionsError, WorkingLocationOptions};
pub use status::{Attributes, LocationState, ResolvedStatus, attribute_keys};
pub use time::{TimeWindow, parse_rfc3339};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
