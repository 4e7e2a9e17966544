use chrono::Utc;
use dioxus::logger::tracing::{error, info, warn};
use dioxus::prelude::*;
use fleet_shared::endpoints::REFRESH_INTERVAL_MS;
use fleet_shared::events::{EventLog, FleetEvent};
use fleet_shared::filter::{apply_filter, FilterCriteria, FilteredFleet};
use fleet_shared::fleet::{FleetData, LoadOutcome};
use fleet_shared::geo::GeoBounds;
use fleet_shared::layout::{LayoutState, ViewState};
use fleet_shared::models::{DeviceKey, DeviceStatus, FleetSnapshot};
use gloo_timers::future::TimeoutFuture;

use crate::api;
use crate::components::device_list::DeviceList;
use crate::components::events_drawer::EventsDrawer;
use crate::components::map_view::{MapMarker, MapView};
use crate::components::status_card::StatusCard;
use crate::components::toolbar::Toolbar;
use crate::pages::login::LoginForm;
use crate::session::use_session;
use crate::viewport::use_viewport_width;

/// Events shown on the status card.
const RECENT_EVENTS_ON_CARD: usize = 5;

/// Fraction of the position spread added around the initial map frame.
const FIT_PADDING_FRACTION: f64 = 0.1;

/// One marker per filtered position. Positions that do not resolve to a
/// listed device become unlinked markers.
fn build_markers(filtered: &FilteredFleet, snapshot: &FleetSnapshot) -> Vec<MapMarker> {
    filtered
        .positions
        .iter()
        .map(|p| match snapshot.resolve(p) {
            Some(device) => MapMarker {
                device: Some(device.key()),
                label: device.name.clone(),
                latitude: p.latitude,
                longitude: p.longitude,
                course: p.course,
                status: device.status,
                is_unknown: device.is_unknown,
                valid: p.valid,
            },
            None => MapMarker {
                device: None,
                label: p
                    .device
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "unlinked".to_string()),
                latitude: p.latitude,
                longitude: p.longitude,
                course: p.course,
                status: DeviceStatus::Unknown,
                is_unknown: true,
                valid: p.valid,
            },
        })
        .collect()
}

/// Frame around every valid position in the snapshot.
fn fit_bounds(snapshot: &FleetSnapshot) -> Option<GeoBounds> {
    GeoBounds::from_points(
        snapshot
            .positions
            .iter()
            .filter(|p| p.valid)
            .map(|p| (p.latitude, p.longitude)),
    )
    .map(|b| b.padded(FIT_PADDING_FRACTION))
}

/// Sorted distinct group ids, for the group chips.
fn group_ids(snapshot: &FleetSnapshot) -> Vec<i64> {
    let mut groups: Vec<i64> = snapshot.devices.iter().filter_map(|d| d.group_id).collect();
    groups.sort_unstable();
    groups.dedup();
    groups
}

/// Events recorded after the drawer was last looked at.
fn unread_count(log: &EventLog, seen_seq: u64) -> usize {
    log.iter().take_while(|e| e.seq > seen_seq).count()
}

fn latest_seq(log: &EventLog) -> u64 {
    log.iter().next().map_or(0, |e| e.seq)
}

/// The fleet console. `focus` preselects a device, e.g. from `/devices/:device`.
#[component]
pub fn Dashboard(focus: Option<DeviceKey>) -> Element {
    let mut session = use_session();

    let mut data = use_signal(FleetData::default);
    let mut layout = use_signal(LayoutState::default);
    let mut criteria = use_signal(FilterCriteria::default);
    let mut visible_bounds = use_signal(|| None::<GeoBounds>);
    let mut seen_seq = use_signal(|| 0u64);
    let mut now = use_signal(Utc::now);

    // One load cycle. A cycle already in flight wins; the caller's tick is dropped.
    let load = use_callback(move |()| {
        let Some(ticket) = data.write().begin_load(session.token().as_deref()) else {
            return;
        };
        spawn(async move {
            let result = api::load_fleet(&ticket.token).await;
            match &result {
                Ok(next) => info!(
                    "Loaded {} devices and {} positions",
                    next.devices.len(),
                    next.positions.len()
                ),
                Err(e) if e.is_unauthorized() => warn!("Access token rejected: {:?}", e),
                Err(e) => error!("Fleet load failed: {:?}", e),
            }
            let outcome = data
                .write()
                .finish_load(&ticket, session.token().as_deref(), result);
            match outcome {
                LoadOutcome::Applied => {
                    if let Some(next) = data.peek().snapshot.as_ref() {
                        layout.write().reconcile(next);
                    }
                }
                LoadOutcome::Expired => session.expire(),
                LoadOutcome::Discarded => info!("Dropped fleet load from an ended session"),
                LoadOutcome::Failed => {}
            }
            now.set(Utc::now());
        });
    });

    // First load, after login or for a token restored at startup. A failed
    // first load waits for the retry button.
    use_effect(move || {
        let needed = data.read().needs_first_load(session.authenticated());
        if needed {
            load.call(());
        }
    });

    use_future(move || async move {
        loop {
            TimeoutFuture::new(REFRESH_INTERVAL_MS).await;
            now.set(Utc::now());
            if session.state.peek().authenticated() && data.peek().snapshot.is_some() {
                load.call(());
            }
        }
    });

    let viewport_width = use_viewport_width();
    use_effect(move || {
        let width = viewport_width();
        layout.write().set_viewport_width(width);
    });

    use_effect(use_reactive!(|(focus,)| {
        if let Some(key) = focus {
            layout.write().select_device(key);
        }
    }));

    let filtered = use_memo(move || match data.read().snapshot.as_ref() {
        Some(s) => apply_filter(&criteria.read(), s, visible_bounds.read().as_ref()),
        None => FilteredFleet::default(),
    });
    let markers = use_memo(move || match data.read().snapshot.as_ref() {
        Some(s) => build_markers(&filtered.read(), s),
        None => Vec::new(),
    });
    let fit = use_memo(move || data.read().snapshot.as_ref().and_then(fit_bounds));
    let events = use_memo(move || data.read().events.clone());
    let selected = use_memo(move || layout.read().selected_device);
    let highlighted = use_memo(move || {
        let geofence = layout.read().selected_geofence;
        match (geofence, data.read().snapshot.as_ref()) {
            (Some(id), Some(s)) => s.devices_in_geofence(id),
            _ => Vec::new(),
        }
    });

    let select_device = move |key: DeviceKey| layout.write().select_device(key);
    let logout = use_callback(move |()| {
        info!("Signing out");
        session.logout();
        data.write().reset();
        seen_seq.set(0);
        criteria.set(FilterCriteria::default());
        layout.set(LayoutState::default());
    });

    let view = data.read().view(session.authenticated());

    let stale = match view {
        ViewState::Unauthenticated => return rsx! { LoginForm {} },
        ViewState::Loading => {
            return rsx! {
                div { class: "center-screen",
                    div { class: "spinner" }
                    p { class: "muted", "Loading fleet…" }
                }
            };
        }
        ViewState::Error(message) => {
            return rsx! {
                div { class: "center-screen",
                    div { class: "panel error-panel",
                        h3 { "Could not load the fleet" }
                        p { "{message}" }
                        button {
                            class: "primary",
                            onclick: move |_| data.write().retry(),
                            "Retry"
                        }
                        button {
                            class: "secondary",
                            onclick: move |_| logout.call(()),
                            "Sign out"
                        }
                    }
                }
            };
        }
        ViewState::Populated { stale } => stale,
    };

    let guard = data.read();
    let Some(current) = guard.snapshot.as_ref() else {
        return rsx! {};
    };
    let state = layout.read().clone();
    let clock = now();
    let visible = filtered.read();

    let card = state
        .selected_device
        .filter(|_| state.status_card_open)
        .and_then(|key| current.device(key))
        .map(|device| {
            let key = device.key();
            let recent: Vec<FleetEvent> = guard
                .events
                .for_device(key)
                .take(RECENT_EVENTS_ON_CARD)
                .cloned()
                .collect();
            (device.clone(), current.position_for(key).cloned(), recent)
        });

    let unread = if state.events_open {
        0
    } else {
        unread_count(&guard.events, *seen_seq.read())
    };
    let geofence_members = highlighted.read().len();

    let toolbar = rsx! {
        Toolbar {
            criteria,
            groups: group_ids(current),
            counts: current.status_counts(),
            refreshing: guard.loading,
            events_open: state.events_open,
            unread_events: unread,
            list_open: state.device_list_open,
            on_toggle_list: move |_| layout.write().toggle_device_list(),
            on_toggle_events: move |_| {
                seen_seq.set(latest_seq(&data.peek().events));
                layout.write().toggle_events();
            },
            on_refresh: move |_| load.call(()),
            on_logout: move |_| logout.call(()),
        }
    };
    let list = rsx! {
        DeviceList {
            devices: visible.devices.clone(),
            total: current.devices.len(),
            selected: state.selected_device,
            now: clock,
            on_select: select_device,
        }
    };
    let map = rsx! {
        MapView {
            markers,
            fit,
            selected,
            highlighted,
            on_select: move |key: Option<DeviceKey>| match key {
                Some(key) => layout.write().select_device(key),
                None => layout.write().clear_selection(),
            },
            on_bounds: move |bounds: GeoBounds| {
                if *visible_bounds.peek() != Some(bounds) {
                    visible_bounds.set(Some(bounds));
                }
            },
        }
    };

    rsx! {
        div { class: if state.is_mobile() { "dashboard mobile" } else { "dashboard desktop" },
            if let Some(message) = stale {
                div { class: "banner banner-warning", role: "status",
                    {format!("Showing the last loaded data. Refresh failed: {}", message)}
                }
            }
            if let Some(id) = state.selected_geofence {
                div { class: "banner banner-info",
                    {format!("Geofence #{}: {} devices inside", id, geofence_members)}
                    button {
                        class: "link-button",
                        onclick: move |_| layout.write().clear_selection(),
                        "Clear"
                    }
                }
            }
            if state.is_mobile() {
                {toolbar}
                div { class: "map-area", {map} }
                if state.device_list_open {
                    div { class: "list-area", {list} }
                }
            } else {
                div { class: "map-area", {map} }
                div { class: "overlay overlay-top", {toolbar} }
                if state.device_list_open {
                    div { class: "overlay overlay-left", {list} }
                }
            }
            if state.events_open {
                div { class: "overlay overlay-right",
                    EventsDrawer {
                        events,
                        now: clock,
                        on_select: select_device,
                        on_clear: move |_| data.write().events.clear(),
                        on_close: move |_| layout.write().toggle_events(),
                    }
                }
            }
            if let Some((device, position, recent)) = card {
                div { class: "overlay overlay-bottom",
                    StatusCard {
                        device,
                        position,
                        recent,
                        now: clock,
                        on_close: move |_| layout.write().close_status_card(),
                        on_select_geofence: move |id: i64| layout.write().select_geofence(id),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_shared::events::EventKind;
    use fleet_shared::models::{Device, PositionRecord};
    use fleet_shared::normalize::assemble_snapshot;

    fn device(id: i64, group: Option<i64>) -> Device {
        Device {
            id,
            name: format!("Truck {}", id),
            unique_id: id.to_string(),
            status: DeviceStatus::Online,
            category: None,
            last_update: None,
            group_id: group,
            disabled: false,
            protocol: None,
            attributes: Default::default(),
            is_unknown: false,
        }
    }

    fn record(
        device_id: Option<i64>,
        unknown_id: Option<i64>,
        lat: f64,
        valid: bool,
    ) -> PositionRecord {
        PositionRecord {
            device_id,
            unknown_device_id: unknown_id,
            latitude: lat,
            longitude: 4.0,
            valid: Some(valid),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_markers_links_and_unlinked() {
        let snapshot = assemble_snapshot(
            vec![device(1, None)],
            None,
            vec![record(Some(1), None, 52.0, true), record(None, Some(8), 51.0, true)],
        );
        let filtered = apply_filter(&FilterCriteria::default(), &snapshot, None);
        let markers = build_markers(&filtered, &snapshot);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].device, Some(DeviceKey::Registered(1)));
        assert_eq!(markers[0].label, "Truck 1");
        assert_eq!(markers[1].device, None);
        assert_eq!(markers[1].label, "unknown-8");
        assert!(markers[1].is_unknown);
    }

    #[test]
    fn test_fit_bounds_skips_invalid_fixes() {
        let snapshot = assemble_snapshot(
            vec![device(1, None), device(2, None)],
            None,
            vec![record(Some(1), None, 52.0, true), record(Some(2), None, 0.0, false)],
        );
        let bounds = fit_bounds(&snapshot).unwrap();
        assert!(bounds.contains(52.0, 4.0));
        assert!(!bounds.contains(0.0, 4.0));
    }

    #[test]
    fn test_fit_bounds_without_positions() {
        let snapshot = assemble_snapshot(vec![device(1, None)], None, vec![]);
        assert!(fit_bounds(&snapshot).is_none());
    }

    #[test]
    fn test_group_ids_sorted_and_unique() {
        let snapshot = assemble_snapshot(
            vec![device(1, Some(3)), device(2, None), device(3, Some(1)), device(4, Some(3))],
            None,
            vec![],
        );
        assert_eq!(group_ids(&snapshot), vec![1, 3]);
    }

    #[test]
    fn test_unread_count() {
        let event = |n: i64| FleetEvent {
            seq: 0,
            device: DeviceKey::Registered(n),
            device_name: n.to_string(),
            kind: EventKind::Moved,
            time: None,
        };
        let mut log = EventLog::default();
        assert_eq!(unread_count(&log, 0), 0);
        log.record(vec![event(1), event(2)]);
        assert_eq!(unread_count(&log, 0), 2);
        let seen = latest_seq(&log);
        log.record(vec![event(3)]);
        assert_eq!(unread_count(&log, seen), 1);
    }
}
