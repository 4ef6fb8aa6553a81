//! One-shot status command.

use std::fmt::Write as _;

use serde_json::Value;
use tracing::debug;

use worklocation_server::{SensorView, local_now};

use crate::commands::build_coordinator;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Polls once and prints the result.
pub async fn run(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let coordinator = build_coordinator(config)?;
    let (now, offset) = local_now();
    debug!(calendar_id = %config.calendar.calendar_id, %now, %offset, "polling working location");

    coordinator.first_refresh(now, offset).await?;
    let view = coordinator.sensor().await;

    if json {
        println!("{}", render_json(&view)?);
    } else {
        print!("{}", render_text(&view));
    }
    Ok(())
}

/// Renders the view as pretty JSON.
pub fn render_json(view: &SensorView) -> ClientResult<String> {
    serde_json::to_string_pretty(view)
        .map_err(|e| ClientError::Provider(format!("failed to serialize status: {}", e)))
}

/// Renders the view as a state line followed by indented attributes.
pub fn render_text(view: &SensorView) -> String {
    let mut out = String::new();
    let state = view.state.as_deref().unwrap_or("unavailable");
    if view.available {
        let _ = writeln!(out, "{}", state);
    } else {
        let _ = writeln!(out, "{} (stale)", state);
    }

    for (key, value) in view.attributes.as_map() {
        let _ = writeln!(out, "  {}: {}", key, display_value(value));
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use worklocation_core::Attributes;

    fn home_view() -> SensorView {
        SensorView {
            state: Some("homeOffice".into()),
            attributes: Attributes::new()
                .with("type", "homeOffice")
                .with("homeOffice", json!({}))
                .with("event_id", "evt1")
                .with("calendar_id", "primary"),
            available: true,
        }
    }

    #[test]
    fn text_lists_attributes_in_order() {
        assert_eq!(
            render_text(&home_view()),
            "homeOffice\n  type: homeOffice\n  homeOffice: {}\n  event_id: evt1\n  calendar_id: primary\n"
        );
    }

    #[test]
    fn text_marks_stale_view() {
        let view = SensorView {
            available: false,
            ..home_view()
        };
        assert!(render_text(&view).starts_with("homeOffice (stale)\n"));
    }

    #[test]
    fn text_without_snapshot() {
        let view = SensorView {
            state: None,
            attributes: Attributes::new(),
            available: false,
        };
        assert_eq!(render_text(&view), "unavailable (stale)\n");
    }

    #[test]
    fn json_shape() {
        let rendered = render_json(&home_view()).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["state"], "homeOffice");
        assert_eq!(value["available"], true);
        assert_eq!(value["attributes"]["event_id"], "evt1");
    }
}
