use crate::models::{DeviceKey, FleetSnapshot};

/// Viewports narrower than this use the stacked mobile layout.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Breakpoint {
    Mobile,
    #[default]
    Desktop,
}

impl Breakpoint {
    pub fn from_width(width_px: f64) -> Breakpoint {
        if width_px < MOBILE_BREAKPOINT_PX {
            Breakpoint::Mobile
        } else {
            Breakpoint::Desktop
        }
    }
}

/// Which of the top-level screens the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Unauthenticated,
    Loading,
    Error(String),
    /// Carries the message of a failed background refresh, if any.
    Populated { stale: Option<String> },
}

impl ViewState {
    /// A loaded snapshot stays on screen through later loads and refresh
    /// failures; only the first load shows the loading or error screens.
    pub fn derive(
        authenticated: bool,
        loading: bool,
        error: Option<&str>,
        has_snapshot: bool,
    ) -> ViewState {
        if !authenticated {
            return ViewState::Unauthenticated;
        }
        if has_snapshot {
            return ViewState::Populated {
                stale: error.map(str::to_string),
            };
        }
        match (loading, error) {
            (false, Some(message)) => ViewState::Error(message.to_string()),
            _ => ViewState::Loading,
        }
    }
}

/// Selection and panel state of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    pub selected_device: Option<DeviceKey>,
    pub selected_geofence: Option<i64>,
    pub device_list_open: bool,
    pub events_open: bool,
    pub status_card_open: bool,
    pub breakpoint: Breakpoint,
}

impl Default for LayoutState {
    fn default() -> Self {
        LayoutState {
            selected_device: None,
            selected_geofence: None,
            device_list_open: true,
            events_open: false,
            status_card_open: false,
            breakpoint: Breakpoint::Desktop,
        }
    }
}

impl LayoutState {
    pub fn select_device(&mut self, key: DeviceKey) {
        self.selected_device = Some(key);
        self.selected_geofence = None;
        self.status_card_open = true;
        // On phones the list covers the map; close it so the card is visible.
        if self.breakpoint == Breakpoint::Mobile {
            self.device_list_open = false;
        }
    }

    pub fn select_geofence(&mut self, id: i64) {
        self.selected_geofence = Some(id);
        self.selected_device = None;
        self.status_card_open = false;
    }

    pub fn clear_selection(&mut self) {
        self.selected_device = None;
        self.selected_geofence = None;
        self.status_card_open = false;
    }

    pub fn close_status_card(&mut self) {
        self.status_card_open = false;
    }

    pub fn toggle_device_list(&mut self) {
        self.device_list_open = !self.device_list_open;
    }

    pub fn toggle_events(&mut self) {
        self.events_open = !self.events_open;
    }

    pub fn set_viewport_width(&mut self, width_px: f64) {
        self.breakpoint = Breakpoint::from_width(width_px);
    }

    pub fn is_mobile(&self) -> bool {
        self.breakpoint == Breakpoint::Mobile
    }

    /// Drop a device selection that no longer exists after a reload.
    pub fn reconcile(&mut self, snapshot: &FleetSnapshot) {
        if let Some(key) = self.selected_device {
            if snapshot.device(key).is_none() {
                self.clear_selection();
            }
        }
    }
}
