use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use fleet_shared::events::EventLog;
use fleet_shared::models::DeviceKey;
use fleet_shared::time::format_relative_time;

#[component]
pub fn EventsDrawer(
    events: ReadSignal<EventLog>,
    now: DateTime<Utc>,
    on_select: EventHandler<DeviceKey>,
    on_clear: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    let log = events.read();

    rsx! {
        div { class: "panel events-drawer",
            div { class: "panel-header",
                h3 { "Events" }
                if !log.is_empty() {
                    button {
                        class: "link-button",
                        onclick: move |_| on_clear.call(()),
                        "Clear"
                    }
                }
                button {
                    class: "close-button",
                    title: "Close",
                    onclick: move |_| on_close.call(()),
                    "×"
                }
            }
            if log.is_empty() {
                p { class: "empty", "No events yet. Changes appear here after each refresh." }
            }
            ul {
                for event in log.iter() {
                    {
                        let device = event.device;
                        let when = event
                            .time
                            .as_deref()
                            .map(|t| format_relative_time(t, now))
                            .unwrap_or_default();
                        rsx! {
                            li {
                                key: "{event.seq}",
                                class: format!("event-row {}", event.kind.css_class()),
                                onclick: move |_| on_select.call(device),
                                span { class: "event-device", "{event.device_name}" }
                                span { class: "event-kind", "{event.kind}" }
                                span { class: "event-time", "{when}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
