//! Options recognised for a configured working-location source.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by [`WorkingLocationOptions::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// The calendar identifier is empty.
    #[error("calendar_id must not be empty")]
    EmptyCalendarId,
    /// The update interval is below the one-minute minimum.
    #[error("update_interval_minutes must be at least {min} (got {got})")]
    IntervalTooShort { min: u32, got: u32 },
}

/// Host-supplied options for one calendar source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingLocationOptions {
    /// Calendar to query.
    pub calendar_id: String,

    /// Minutes between polls.
    #[serde(alias = "update_interval")]
    pub update_interval_minutes: u32,

    /// Report `none` when no event covers the current instant.
    #[serde(alias = "consider_none_outside_hours")]
    pub none_outside_hours: bool,
}

impl Default for WorkingLocationOptions {
    fn default() -> Self {
        Self {
            calendar_id: Self::DEFAULT_CALENDAR_ID.to_string(),
            update_interval_minutes: Self::DEFAULT_UPDATE_INTERVAL_MINUTES,
            none_outside_hours: false,
        }
    }
}

impl WorkingLocationOptions {
    /// Default calendar identifier.
    pub const DEFAULT_CALENDAR_ID: &'static str = "primary";

    /// Default poll interval in minutes.
    pub const DEFAULT_UPDATE_INTERVAL_MINUTES: u32 = 5;

    /// Smallest accepted poll interval in minutes.
    pub const MIN_UPDATE_INTERVAL_MINUTES: u32 = 1;

    /// Creates options for the given calendar with defaults elsewhere.
    pub fn new(calendar_id: impl Into<String>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            ..Default::default()
        }
    }

    /// Builder: set the poll interval in minutes.
    pub fn with_update_interval_minutes(mut self, minutes: u32) -> Self {
        self.update_interval_minutes = minutes;
        self
    }

    /// Builder: set the none-outside-hours policy.
    pub fn with_none_outside_hours(mut self, enabled: bool) -> Self {
        self.none_outside_hours = enabled;
        self
    }

    /// Returns the poll interval, never shorter than one minute.
    pub fn update_interval(&self) -> Duration {
        let minutes = self
            .update_interval_minutes
            .max(Self::MIN_UPDATE_INTERVAL_MINUTES);
        Duration::from_secs(u64::from(minutes) * 60)
    }

    /// Validates the options.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.calendar_id.trim().is_empty() {
            return Err(OptionsError::EmptyCalendarId);
        }
        if self.update_interval_minutes < Self::MIN_UPDATE_INTERVAL_MINUTES {
            return Err(OptionsError::IntervalTooShort {
                min: Self::MIN_UPDATE_INTERVAL_MINUTES,
                got: self.update_interval_minutes,
            });
        }
        Ok(())
    }
}
