//! Resolver: picks the governing event of the day and derives the status.
//!
//! Selection prefers the first event covering `now`, falling back to the
//! first event of the day. Attributes are copied from the selected event's
//! `workingLocationProperties` only when the source field is present.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use worklocation_core::status::attribute_keys as keys;
use worklocation_core::{Attributes, LocationState, ResolvedStatus};

use crate::raw_event::RawEvent;

/// Nested `officeLocation` fields, in the order they are published.
const OFFICE_FIELDS: [(&str, &str); 5] = [
    ("buildingId", keys::OFFICE_BUILDING_ID),
    ("floorId", keys::OFFICE_FLOOR_ID),
    ("floorSectionId", keys::OFFICE_FLOOR_SECTION_ID),
    ("deskId", keys::OFFICE_DESK_ID),
    ("label", keys::OFFICE_LABEL),
];

/// Resolves the events of one local day into a status.
///
/// `events` must be in API order (ascending start time). With
/// `none_outside_hours` set, a day whose events do not cover `now` resolves to
/// [`LocationState::NoLocation`]; the fallback event still supplies
/// `event_id`, `start` and `end`, but no location fields are published.
///
/// The result is always available: resolution itself cannot fail.
pub fn resolve(
    events: &[RawEvent],
    now: DateTime<Utc>,
    calendar_id: &str,
    none_outside_hours: bool,
) -> ResolvedStatus {
    let Some((selected, covers)) = select_event(events, now) else {
        debug!(calendar_id, "no working location events today");
        return ResolvedStatus::new(
            LocationState::NoLocation,
            Attributes::new().with(keys::CALENDAR_ID, calendar_id),
        );
    };

    debug!(
        calendar_id,
        event_id = selected.id.as_deref().unwrap_or("<missing>"),
        covers_now = covers,
        "selected working location event"
    );

    if !covers && none_outside_hours {
        let mut attributes = Attributes::new();
        insert_operational(&mut attributes, selected, calendar_id);
        return ResolvedStatus::new(LocationState::NoLocation, attributes);
    }

    let (state, mut attributes) = location_attributes(selected.working_location_properties.as_ref());
    insert_operational(&mut attributes, selected, calendar_id);
    ResolvedStatus::new(state, attributes)
}

/// Returns the governing event and whether it covers `now`.
pub fn select_event(events: &[RawEvent], now: DateTime<Utc>) -> Option<(&RawEvent, bool)> {
    events
        .iter()
        .find(|event| covers_now(event, now))
        .map(|event| (event, true))
        .or_else(|| events.first().map(|event| (event, false)))
}

/// Returns true if the event's range includes `now`.
///
/// A timed event covers `[start, end)`. An event whose start uses the
/// date-only form covers the whole day. An event with an unparseable
/// `dateTime` covers nothing.
pub fn covers_now(event: &RawEvent, now: DateTime<Utc>) -> bool {
    let (Some(start), Some(end)) = (event.start.as_ref(), event.end.as_ref()) else {
        return event.is_all_day();
    };

    if start.date_time.is_some() && end.date_time.is_some() {
        return match (start.parsed_date_time(), end.parsed_date_time()) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        };
    }

    start.date.is_some()
}

/// Derives the state and the type-specific attributes.
fn location_attributes(properties: Option<&Value>) -> (LocationState, Attributes) {
    let mut attributes = Attributes::new();

    let Some(properties) = properties else {
        return (LocationState::Unknown, attributes);
    };
    let empty = Map::new();
    let fields = properties.as_object().unwrap_or(&empty);

    let location_type = fields.get("type");
    let state = location_type
        .and_then(Value::as_str)
        .and_then(LocationState::from_location_type)
        .unwrap_or(LocationState::Unknown);

    if location_type.is_some_and(is_truthy) {
        attributes.insert_present(keys::TYPE, location_type);
    }

    attributes.insert_present(keys::HOME_OFFICE, fields.get("homeOffice"));

    if let Some(custom) = fields.get("customLocation").and_then(Value::as_object) {
        attributes.insert_present(keys::CUSTOM_LOCATION_LABEL, custom.get("label"));
    }

    if let Some(office) = fields.get("officeLocation").and_then(Value::as_object) {
        for (field, key) in OFFICE_FIELDS {
            attributes.insert_present(key, office.get(field));
        }
    }

    if state == LocationState::Unknown && !is_empty_value(properties) {
        attributes.insert(keys::RAW_PROPERTIES, properties.clone());
    }

    (state, attributes)
}

fn insert_operational(attributes: &mut Attributes, event: &RawEvent, calendar_id: &str) {
    attributes.insert_some(keys::EVENT_ID, event.id.as_deref());
    attributes.insert_some(keys::START, event.raw_start());
    attributes.insert_some(keys::END, event.raw_end());
    attributes.insert(keys::CALENDAR_ID, calendar_id);
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
