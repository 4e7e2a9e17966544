use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::models::{DeviceKey, DeviceStatus, FleetSnapshot, Position};

/// Number of events the drawer keeps.
pub const MAX_EVENTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CameOnline,
    WentOffline,
    UnknownDeviceSeen,
    Moved,
    FixLost,
}

impl EventKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            EventKind::CameOnline => "event-online",
            EventKind::WentOffline => "event-offline",
            EventKind::UnknownDeviceSeen => "event-unknown",
            EventKind::Moved => "event-moved",
            EventKind::FixLost => "event-fix-lost",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::CameOnline => write!(f, "came online"),
            EventKind::WentOffline => write!(f, "went offline"),
            EventKind::UnknownDeviceSeen => write!(f, "unknown device reporting"),
            EventKind::Moved => write!(f, "reported a new position"),
            EventKind::FixLost => write!(f, "lost GPS fix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FleetEvent {
    /// Monotonic sequence number assigned by the log.
    pub seq: u64,
    pub device: DeviceKey,
    pub device_name: String,
    pub kind: EventKind,
    pub time: Option<String>,
}

/// Compare two consecutive snapshots and describe what changed.
///
/// Events come out in device-list order of `next`.
pub fn derive_events(prev: &FleetSnapshot, next: &FleetSnapshot) -> Vec<FleetEvent> {
    let prev_status: HashMap<DeviceKey, DeviceStatus> =
        prev.devices.iter().map(|d| (d.key(), d.status)).collect();
    let mut events = Vec::new();

    for device in &next.devices {
        let key = device.key();
        let mut push = |kind: EventKind, time: Option<&str>| {
            events.push(FleetEvent {
                seq: 0,
                device: key,
                device_name: device.name.clone(),
                kind,
                time: time
                    .map(str::to_string)
                    .or_else(|| device.last_update.clone()),
            });
        };

        match prev_status.get(&key) {
            None if device.is_unknown => push(EventKind::UnknownDeviceSeen, None),
            Some(old) if *old != device.status => match device.status {
                DeviceStatus::Online => push(EventKind::CameOnline, None),
                DeviceStatus::Offline => push(EventKind::WentOffline, None),
                DeviceStatus::Unknown => {}
            },
            _ => {}
        }

        let old_pos = prev.position_for(key);
        let new_pos = next.position_for(key);
        if let Some(new_pos) = new_pos {
            if moved(old_pos, new_pos) {
                push(EventKind::Moved, new_pos.time.as_deref());
            }
            if old_pos.is_some_and(|p| p.valid) && !new_pos.valid {
                push(EventKind::FixLost, new_pos.time.as_deref());
            }
        }
    }
    events
}

fn moved(old: Option<&Position>, new: &Position) -> bool {
    match old {
        None => true,
        Some(old) => {
            old.time != new.time
                || old.latitude != new.latitude
                || old.longitude != new.longitude
        }
    }
}

/// Bounded newest-first event history.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    events: VecDeque<FleetEvent>,
    capacity: usize,
    next_seq: u64,
    /// Unknown devices reported by any snapshot observed so far.
    seen_unknown: HashSet<DeviceKey>,
}

impl Default for EventLog {
    fn default() -> Self {
        EventLog::with_capacity(MAX_EVENTS)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        EventLog {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 1,
            seen_unknown: HashSet::new(),
        }
    }

    /// Record what changed between two consecutive snapshots.
    ///
    /// The first snapshot (`prev` is `None`) only seeds the set of known
    /// unknown devices. An unknown device is announced once, even if it drops
    /// out of a snapshot because its list could not be read.
    pub fn observe(&mut self, prev: Option<&FleetSnapshot>, next: &FleetSnapshot) {
        if let Some(prev) = prev {
            let seen = &self.seen_unknown;
            let batch = derive_events(prev, next)
                .into_iter()
                .filter(|e| !(e.kind == EventKind::UnknownDeviceSeen && seen.contains(&e.device)))
                .collect();
            self.record(batch);
        }
        self.seen_unknown
            .extend(next.devices.iter().filter(|d| d.is_unknown).map(|d| d.key()));
    }

    /// Record a batch; later entries in the batch end up newer.
    pub fn record(&mut self, batch: Vec<FleetEvent>) {
        for mut event in batch {
            event.seq = self.next_seq;
            self.next_seq += 1;
            self.events.push_front(event);
        }
        self.events.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FleetEvent> {
        self.events.iter()
    }

    pub fn for_device(&self, key: DeviceKey) -> impl Iterator<Item = &FleetEvent> {
        self.events.iter().filter(move |e| e.device == key)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop the history. Unknown devices already announced stay known.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Forget everything, as on sign-out.
    pub fn reset(&mut self) {
        *self = EventLog::with_capacity(self.capacity);
    }
}
