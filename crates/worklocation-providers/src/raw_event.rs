//! Raw working-location event as returned by the events-list endpoint.
//!
//! Every field is optional: the payload is loosely typed and a single odd
//! item must not abort the poll. Strings are kept exactly as received so the
//! resolver can echo them back byte-for-byte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use worklocation_core::parse_rfc3339;

/// The expected `eventType` for working-location entries.
pub const WORKING_LOCATION_EVENT_TYPE: &str = "workingLocation";

/// The start or end of a raw event.
///
/// All-day events carry `date`; timed events carry `dateTime`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    /// Date-only form (`YYYY-MM-DD`) for all-day events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// RFC3339 form for timed events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// IANA timezone the event was created in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl RawEventTime {
    /// Creates an all-day time.
    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Default::default()
        }
    }

    /// Creates a timed value from an RFC3339 string.
    pub fn date_time(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Default::default()
        }
    }

    /// Returns true if this uses the date-only form.
    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }

    /// Returns the raw string, preferring `dateTime` over `date`.
    pub fn raw_value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }

    /// Parses `dateTime` into UTC, if present and valid.
    pub fn parsed_date_time(&self) -> Option<DateTime<Utc>> {
        self.date_time.as_deref().and_then(parse_rfc3339)
    }
}

/// A raw event record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Event identifier.
    #[serde(default)]
    pub id: Option<String>,

    /// Event type, expected to be `workingLocation`.
    #[serde(default)]
    pub event_type: Option<String>,

    /// When the event starts.
    #[serde(default)]
    pub start: Option<RawEventTime>,

    /// When the event ends.
    #[serde(default)]
    pub end: Option<RawEventTime>,

    /// Nested working-location details, kept untyped.
    #[serde(default)]
    pub working_location_properties: Option<Value>,
}

impl RawEvent {
    /// Creates an event with the given id and bounds.
    pub fn new(id: impl Into<String>, start: RawEventTime, end: RawEventTime) -> Self {
        Self {
            id: Some(id.into()),
            event_type: Some(WORKING_LOCATION_EVENT_TYPE.to_string()),
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    /// Builder: set `workingLocationProperties`.
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.working_location_properties = Some(properties);
        self
    }

    /// Decodes one item from the `items` array.
    ///
    /// An item that does not fit the expected shape is kept as a degraded
    /// event: its id survives if it is a string, everything else is dropped.
    pub fn from_item(item: Value) -> Self {
        match serde_json::from_value::<RawEvent>(item.clone()) {
            Ok(event) => event,
            Err(e) => {
                let id = item.get("id").and_then(Value::as_str).map(String::from);
                warn!(
                    event_id = id.as_deref().unwrap_or("<missing>"),
                    error = %e,
                    "malformed working location event"
                );
                Self {
                    id,
                    ..Default::default()
                }
            }
        }
    }

    /// Returns true if the event uses the date-only form for its start.
    pub fn is_all_day(&self) -> bool {
        self.start.as_ref().is_some_and(RawEventTime::is_all_day)
    }

    /// Raw start string (date or RFC3339), if any.
    pub fn raw_start(&self) -> Option<&str> {
        self.start.as_ref().and_then(RawEventTime::raw_value)
    }

    /// Raw end string (date or RFC3339), if any.
    pub fn raw_end(&self) -> Option<&str> {
        self.end.as_ref().and_then(RawEventTime::raw_value)
    }

    /// Returns true if `eventType` is absent or `workingLocation`.
    pub fn is_working_location(&self) -> bool {
        self.event_type
            .as_deref()
            .is_none_or(|t| t == WORKING_LOCATION_EVENT_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_timed_event() {
        let event = RawEvent::from_item(json!({
            "id": "evt1",
            "eventType": "workingLocation",
            "start": {"dateTime": "2024-01-15T09:00:00Z", "timeZone": "Europe/Paris"},
            "end": {"dateTime": "2024-01-15T17:00:00Z"},
            "workingLocationProperties": {"type": "homeOffice", "homeOffice": {}}
        }));

        assert_eq!(event.id.as_deref(), Some("evt1"));
        assert!(!event.is_all_day());
        assert!(event.is_working_location());
        assert_eq!(event.raw_start(), Some("2024-01-15T09:00:00Z"));
        assert_eq!(
            event.start.as_ref().unwrap().time_zone.as_deref(),
            Some("Europe/Paris")
        );
        assert_eq!(
            event.working_location_properties,
            Some(json!({"type": "homeOffice", "homeOffice": {}}))
        );
    }

    #[test]
    fn parse_all_day_event() {
        let event = RawEvent::from_item(json!({
            "id": "evt-allday",
            "start": {"date": "2024-01-15"},
            "end": {"date": "2024-01-16"}
        }));

        assert!(event.is_all_day());
        assert_eq!(event.raw_start(), Some("2024-01-15"));
        assert_eq!(event.raw_end(), Some("2024-01-16"));
        assert!(event.working_location_properties.is_none());
    }

    #[test]
    fn null_properties_are_absent() {
        let event = RawEvent::from_item(json!({
            "id": "evt",
            "workingLocationProperties": null
        }));
        assert!(event.working_location_properties.is_none());
    }

    #[test]
    fn malformed_item_keeps_id() {
        let event = RawEvent::from_item(json!({
            "id": "bad",
            "start": "2024-01-15"
        }));
        assert_eq!(event.id.as_deref(), Some("bad"));
        assert!(event.start.is_none());
        assert!(event.working_location_properties.is_none());
    }

    #[test]
    fn non_object_item_is_empty() {
        let event = RawEvent::from_item(json!(42));
        assert_eq!(event, RawEvent::default());
    }

    #[test]
    fn raw_value_prefers_date_time() {
        let time = RawEventTime {
            date: Some("2024-01-15".into()),
            date_time: Some("2024-01-15T09:00:00+01:00".into()),
            time_zone: None,
        };
        assert_eq!(time.raw_value(), Some("2024-01-15T09:00:00+01:00"));
        assert!(!time.is_all_day());
        assert!(time.parsed_date_time().is_some());
    }

    #[test]
    fn other_event_types_are_flagged() {
        let event = RawEvent {
            event_type: Some("default".into()),
            ..Default::default()
        };
        assert!(!event.is_working_location());
    }
}
