use dioxus::prelude::*;
use fleet_shared::filter::{FilterCriteria, SortKey};
use fleet_shared::models::{DeviceStatus, StatusCounts};

fn status_count(counts: &StatusCounts, status: DeviceStatus) -> usize {
    match status {
        DeviceStatus::Online => counts.online,
        DeviceStatus::Offline => counts.offline,
        DeviceStatus::Unknown => counts.unknown,
    }
}

#[component]
pub fn Toolbar(
    criteria: Signal<FilterCriteria>,
    groups: Vec<i64>,
    counts: StatusCounts,
    refreshing: bool,
    events_open: bool,
    unread_events: usize,
    list_open: bool,
    on_toggle_list: EventHandler<()>,
    on_toggle_events: EventHandler<()>,
    on_refresh: EventHandler<()>,
    on_logout: EventHandler<()>,
) -> Element {
    let current = criteria.read().clone();

    rsx! {
        div { class: "toolbar",
            div { class: "toolbar-row",
                button {
                    class: if list_open { "icon-button active" } else { "icon-button" },
                    title: "Toggle device list",
                    onclick: move |_| on_toggle_list.call(()),
                    "☰"
                }
                input {
                    class: "search",
                    r#type: "search",
                    placeholder: "Search name or ID...",
                    value: "{current.keyword}",
                    oninput: move |evt: Event<FormData>| {
                        criteria.write().keyword = evt.value();
                    },
                }
                select {
                    value: "{current.sort}",
                    onchange: move |evt: Event<FormData>| {
                        if let Ok(key) = evt.value().parse::<SortKey>() {
                            criteria.write().sort = key;
                        }
                    },
                    for key in SortKey::ALL {
                        option {
                            value: "{key}",
                            selected: current.sort == key,
                            {format!("Sort: {}", key.label())}
                        }
                    }
                }
                button {
                    class: if events_open { "icon-button active" } else { "icon-button" },
                    title: "Events",
                    onclick: move |_| on_toggle_events.call(()),
                    "Events"
                    if unread_events > 0 && !events_open {
                        span { class: "badge badge-count", "{unread_events}" }
                    }
                }
                button {
                    class: "icon-button",
                    title: "Refresh now",
                    disabled: refreshing,
                    onclick: move |_| on_refresh.call(()),
                    if refreshing { "…" } else { "⟳" }
                }
                button {
                    class: "secondary",
                    onclick: move |_| on_logout.call(()),
                    "Sign out"
                }
            }
            div { class: "toolbar-row chips",
                for status in DeviceStatus::ALL {
                    button {
                        class: if current.statuses.contains(&status) { "chip active" } else { "chip" },
                        onclick: move |_| criteria.write().toggle_status(status),
                        span { class: crate::components::device_list::status_class(status) }
                        {format!("{} ({})", status, status_count(&counts, status))}
                    }
                }
                for group in groups {
                    button {
                        class: if current.groups.contains(&group) { "chip active" } else { "chip" },
                        onclick: move |_| criteria.write().toggle_group(group),
                        "Group {group}"
                    }
                }
                label { class: "chip-toggle",
                    input {
                        r#type: "checkbox",
                        checked: current.map_bounds_only,
                        onchange: move |evt: Event<FormData>| {
                            criteria.write().map_bounds_only = evt.checked();
                        },
                    }
                    "Only in map view"
                }
                if current.narrows() || current.map_bounds_only {
                    button {
                        class: "chip clear",
                        onclick: move |_| {
                            let sort = criteria.read().sort;
                            criteria.set(FilterCriteria { sort, ..Default::default() });
                        },
                        "Clear filters"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_count() {
        let counts = StatusCounts {
            online: 3,
            offline: 1,
            unknown: 2,
        };
        assert_eq!(status_count(&counts, DeviceStatus::Online), 3);
        assert_eq!(status_count(&counts, DeviceStatus::Offline), 1);
        assert_eq!(status_count(&counts, DeviceStatus::Unknown), 2);
    }
}
