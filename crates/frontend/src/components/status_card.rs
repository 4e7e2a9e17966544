use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use fleet_shared::events::FleetEvent;
use fleet_shared::geo::{course_label, format_lat_lon};
use fleet_shared::models::{Device, Position};
use fleet_shared::time::{format_absolute_time, format_relative_time};

use crate::components::device_list::status_class;

/// Label/value pairs shown in the card body, in display order. Missing
/// values are skipped.
fn detail_rows(
    device: &Device,
    position: Option<&Position>,
    now: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    let mut rows = vec![("ID", device.unique_id.clone())];
    if let Some(category) = device.category.as_deref() {
        rows.push(("Category", category.to_string()));
    }
    if let Some(group) = device.group_id {
        rows.push(("Group", group.to_string()));
    }
    if let Some(protocol) = device.protocol.as_deref() {
        rows.push(("Protocol", protocol.to_string()));
    }
    if let Some(updated) = device.last_update.as_deref() {
        rows.push((
            "Last update",
            format!(
                "{} ({})",
                format_relative_time(updated, now),
                format_absolute_time(updated)
            ),
        ));
    }

    let Some(p) = position else {
        rows.push(("Position", "No position reported".to_string()));
        return rows;
    };
    rows.push(("Position", format_lat_lon(p.latitude, p.longitude)));
    if !p.valid {
        rows.push(("Fix", "Invalid".to_string()));
    }
    if let Some(time) = p.time.as_deref() {
        rows.push(("Fix time", format_absolute_time(time)));
    }
    if let Some(speed) = p.speed {
        rows.push(("Speed", format!("{:.1}", speed)));
    }
    if let Some(course) = p.course {
        rows.push(("Course", format!("{:.0}° {}", course, course_label(course))));
    }
    if let Some(altitude) = p.altitude {
        rows.push(("Altitude", format!("{:.0} m", altitude)));
    }
    if p.protocol != device.protocol.as_deref().unwrap_or_default() {
        rows.push(("Source", p.protocol.clone()));
    }
    rows
}

fn attribute_rows(device: &Device, position: Option<&Position>) -> Vec<(String, String)> {
    let render = |v: &serde_json::Value| match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut rows: Vec<(String, String)> = device
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), render(v)))
        .collect();
    if let Some(p) = position {
        rows.extend(p.attributes.iter().map(|(k, v)| (k.clone(), render(v))));
    }
    rows
}

#[component]
pub fn StatusCard(
    device: Device,
    position: Option<Position>,
    recent: Vec<FleetEvent>,
    now: DateTime<Utc>,
    on_close: EventHandler<()>,
    on_select_geofence: EventHandler<i64>,
) -> Element {
    let rows = detail_rows(&device, position.as_ref(), now);
    let attributes = attribute_rows(&device, position.as_ref());
    let geofences = position
        .as_ref()
        .map(|p| p.geofence_ids.clone())
        .unwrap_or_default();

    rsx! {
        div { class: "panel status-card",
            div { class: "panel-header",
                span { class: status_class(device.status) }
                h3 { "{device.name}" }
                button {
                    class: "close-button",
                    title: "Close",
                    onclick: move |_| on_close.call(()),
                    "×"
                }
            }
            div { class: "status-line",
                span { class: "muted", "{device.status}" }
                if device.is_unknown {
                    span { class: "badge badge-unknown", "unregistered" }
                }
                if device.disabled {
                    span { class: "badge", "disabled" }
                }
            }
            dl { class: "details",
                for (label, value) in rows {
                    dt { "{label}" }
                    dd { "{value}" }
                }
            }
            if !geofences.is_empty() {
                div { class: "geofences",
                    span { class: "muted", "Geofences" }
                    for id in geofences {
                        button {
                            class: "chip",
                            onclick: move |_| on_select_geofence.call(id),
                            "#{id}"
                        }
                    }
                }
            }
            if !attributes.is_empty() {
                details { class: "attributes",
                    summary { {format!("Attributes ({})", attributes.len())} }
                    dl { class: "details",
                        for (k, v) in attributes {
                            dt { "{k}" }
                            dd { "{v}" }
                        }
                    }
                }
            }
            if !recent.is_empty() {
                div { class: "recent-events",
                    span { class: "muted", "Recent" }
                    ul {
                        for event in recent {
                            li { key: "{event.seq}",
                                "{event.kind}"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fleet_shared::models::{DeviceKey, DeviceStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn device() -> Device {
        Device {
            id: 9,
            name: "Van 9".to_string(),
            unique_id: "864".to_string(),
            status: DeviceStatus::Online,
            category: Some("van".to_string()),
            last_update: Some("2024-05-01T11:55:00Z".to_string()),
            group_id: None,
            disabled: false,
            protocol: Some("osmand".to_string()),
            attributes: Default::default(),
            is_unknown: false,
        }
    }

    fn position() -> Position {
        Position {
            id: Some(1),
            device: Some(DeviceKey::Registered(9)),
            latitude: 52.374031,
            longitude: 4.88969,
            altitude: None,
            speed: Some(12.345),
            course: Some(90.0),
            time: Some("2024-05-01T11:55:00Z".to_string()),
            valid: true,
            protocol: "osmand".to_string(),
            geofence_ids: vec![],
            attributes: Default::default(),
        }
    }

    fn value<'a>(rows: &'a [(&'static str, String)], label: &str) -> Option<&'a str> {
        rows.iter().find(|(l, _)| *l == label).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_detail_rows_with_position() {
        let rows = detail_rows(&device(), Some(&position()), now());
        assert_eq!(value(&rows, "ID"), Some("864"));
        assert_eq!(value(&rows, "Position"), Some("52.37403, 4.88969"));
        assert_eq!(value(&rows, "Speed"), Some("12.3"));
        assert_eq!(value(&rows, "Course"), Some("90° E"));
        assert_eq!(
            value(&rows, "Last update"),
            Some("5m ago (2024-05-01 11:55:00 UTC)")
        );
        assert!(value(&rows, "Fix").is_none());
        assert!(value(&rows, "Source").is_none(), "same protocol as device");
    }

    #[test]
    fn test_detail_rows_without_position() {
        let rows = detail_rows(&device(), None, now());
        assert_eq!(value(&rows, "Position"), Some("No position reported"));
        assert!(value(&rows, "Speed").is_none());
    }

    #[test]
    fn test_detail_rows_invalid_fix() {
        let mut p = position();
        p.valid = false;
        p.protocol = "gt06".to_string();
        let rows = detail_rows(&device(), Some(&p), now());
        assert_eq!(value(&rows, "Fix"), Some("Invalid"));
        assert_eq!(value(&rows, "Source"), Some("gt06"));
    }

    #[test]
    fn test_attribute_rows_render_values() {
        let mut d = device();
        d.attributes
            .insert("driver".to_string(), serde_json::json!("Ana"));
        let mut p = position();
        p.attributes.insert("battery".to_string(), serde_json::json!(87));
        let rows = attribute_rows(&d, Some(&p));
        assert_eq!(
            rows,
            vec![
                ("driver".to_string(), "Ana".to_string()),
                ("battery".to_string(), "87".to_string())
            ]
        );
    }
}
