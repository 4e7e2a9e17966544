use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use fleet_shared::models::{Device, DeviceKey, DeviceStatus};
use fleet_shared::time::format_relative_time;

pub fn status_class(status: DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Online => "status-dot online",
        DeviceStatus::Offline => "status-dot offline",
        DeviceStatus::Unknown => "status-dot unknown",
    }
}

/// Secondary line under the device name: hardware id, then category.
fn device_subtitle(device: &Device) -> String {
    match device.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) => format!("{} · {}", device.unique_id, category),
        None => device.unique_id.clone(),
    }
}

fn count_label(shown: usize, total: usize) -> String {
    if shown == total {
        format!("{} devices", total)
    } else {
        format!("{} of {} devices", shown, total)
    }
}

#[component]
pub fn DeviceList(
    devices: Vec<Device>,
    total: usize,
    selected: Option<DeviceKey>,
    now: DateTime<Utc>,
    on_select: EventHandler<DeviceKey>,
) -> Element {
    let header = count_label(devices.len(), total);

    rsx! {
        div { class: "panel device-list",
            div { class: "panel-header",
                h3 { "Devices" }
                span { class: "muted", "{header}" }
            }
            if devices.is_empty() {
                p { class: "empty", "No devices match the current filters." }
            }
            ul {
                for device in devices {
                    {
                        let key = device.key();
                        let is_selected = selected == Some(key);
                        let subtitle = device_subtitle(&device);
                        let updated = device
                            .last_update
                            .as_deref()
                            .map(|t| format_relative_time(t, now))
                            .unwrap_or_else(|| "never".to_string());
                        rsx! {
                            li {
                                key: "{key}",
                                class: if is_selected { "device-row selected" } else { "device-row" },
                                onclick: move |_| on_select.call(key),
                                span { class: status_class(device.status), title: "{device.status}" }
                                div { class: "device-row-text",
                                    div { class: "device-name",
                                        "{device.name}"
                                        if device.is_unknown {
                                            span { class: "badge badge-unknown", "unregistered" }
                                        }
                                        if device.disabled {
                                            span { class: "badge", "disabled" }
                                        }
                                    }
                                    div { class: "device-meta", "{subtitle}" }
                                }
                                span { class: "device-updated", "{updated}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
