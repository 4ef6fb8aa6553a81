//! Resolved working-location status.
//!
//! This module defines the output of a poll cycle: a [`LocationState`], the
//! ordered [`Attributes`] mapping handed to the presentation layer, and the
//! [`ResolvedStatus`] that bundles them with an availability flag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute keys published alongside the state.
pub mod attribute_keys {
    /// The raw `workingLocationProperties.type` value.
    pub const TYPE: &str = "type";
    /// The raw `workingLocationProperties.homeOffice` value.
    pub const HOME_OFFICE: &str = "homeOffice";
    /// `customLocation.label`.
    pub const CUSTOM_LOCATION_LABEL: &str = "customLocation_label";
    /// `officeLocation.buildingId`.
    pub const OFFICE_BUILDING_ID: &str = "officeLocation_buildingId";
    /// `officeLocation.floorId`.
    pub const OFFICE_FLOOR_ID: &str = "officeLocation_floorId";
    /// `officeLocation.floorSectionId`.
    pub const OFFICE_FLOOR_SECTION_ID: &str = "officeLocation_floorSectionId";
    /// `officeLocation.deskId`.
    pub const OFFICE_DESK_ID: &str = "officeLocation_deskId";
    /// `officeLocation.label`.
    pub const OFFICE_LABEL: &str = "officeLocation_label";
    /// Raw `workingLocationProperties`, attached only for unrecognised types.
    pub const RAW_PROPERTIES: &str = "workingLocationProperties";
    /// Id of the selected event.
    pub const EVENT_ID: &str = "event_id";
    /// Raw start of the selected event (date or RFC3339 string).
    pub const START: &str = "start";
    /// Raw end of the selected event (date or RFC3339 string).
    pub const END: &str = "end";
    /// The queried calendar identifier.
    pub const CALENDAR_ID: &str = "calendar_id";

    /// Keys derived from `workingLocationProperties`.
    pub const TYPE_SPECIFIC: [&str; 9] = [
        TYPE,
        HOME_OFFICE,
        CUSTOM_LOCATION_LABEL,
        OFFICE_BUILDING_ID,
        OFFICE_FLOOR_ID,
        OFFICE_FLOOR_SECTION_ID,
        OFFICE_DESK_ID,
        OFFICE_LABEL,
        RAW_PROPERTIES,
    ];
}

/// The normalized daily working-location state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationState {
    /// Working from home.
    #[serde(rename = "homeOffice")]
    HomeOffice,
    /// Working from an office.
    #[serde(rename = "officeLocation")]
    OfficeLocation,
    /// Working from a user-labelled place.
    #[serde(rename = "customLocation")]
    CustomLocation,
    /// No working location applies.
    #[serde(rename = "none")]
    NoLocation,
    /// An event exists but its location could not be classified.
    #[serde(rename = "unknown")]
    Unknown,
}

impl LocationState {
    /// Returns the wire/state string for this value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomeOffice => "homeOffice",
            Self::OfficeLocation => "officeLocation",
            Self::CustomLocation => "customLocation",
            Self::NoLocation => "none",
            Self::Unknown => "unknown",
        }
    }

    /// Maps a `workingLocationProperties.type` value to a state.
    ///
    /// Only the three location types are recognised; anything else is `None`.
    pub fn from_location_type(value: &str) -> Option<Self> {
        match value {
            "homeOffice" => Some(Self::HomeOffice),
            "officeLocation" => Some(Self::OfficeLocation),
            "customLocation" => Some(Self::CustomLocation),
            _ => None,
        }
    }
}

impl fmt::Display for LocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the five state values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised working location state: {0}")]
pub struct ParseStateError(String);

impl FromStr for LocationState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::NoLocation),
            "unknown" => Ok(Self::Unknown),
            other => Self::from_location_type(other).ok_or_else(|| ParseStateError(other.into())),
        }
    }
}

/// Insertion-ordered attribute mapping.
///
/// Keys are only ever added from data that is present in the source payload:
/// [`insert_present`](Self::insert_present) and [`insert_some`](Self::insert_some)
/// skip absent values instead of writing a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value that is always available (e.g. the calendar id).
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Copies a source field if it is present.
    ///
    /// An explicit JSON `null` in the source counts as present and is copied.
    /// Returns true if the key was written.
    pub fn insert_present(&mut self, key: &str, value: Option<&Value>) -> bool {
        match value {
            Some(value) => {
                self.0.insert(key.to_string(), value.clone());
                true
            }
            None => false,
        }
    }

    /// Inserts an owned value if it is present.
    pub fn insert_some<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> bool {
        match value {
            Some(value) => {
                self.0.insert(key.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value for a key if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns true if any key derived from `workingLocationProperties` is set.
    pub fn has_type_specific(&self) -> bool {
        attribute_keys::TYPE_SPECIFIC
            .iter()
            .any(|key| self.contains_key(key))
    }
}

impl From<Attributes> for Map<String, Value> {
    fn from(attributes: Attributes) -> Self {
        attributes.0
    }
}

/// The result of resolving one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStatus {
    /// The normalized state.
    pub state: LocationState,
    /// Attributes for the presentation layer.
    pub attributes: Attributes,
    /// Whether the status reflects a completed fetch.
    pub available: bool,
}

impl ResolvedStatus {
    /// Creates an available status.
    pub fn new(state: LocationState, attributes: Attributes) -> Self {
        Self {
            state,
            attributes,
            available: true,
        }
    }

    /// Returns the state string.
    pub fn state_str(&self) -> &'static str {
        self.state.as_str()
    }
}
