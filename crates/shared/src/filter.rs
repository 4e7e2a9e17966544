use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::geo::GeoBounds;
use crate::models::{Device, DeviceKey, DeviceStatus, FleetSnapshot, Position};
use crate::time::parse_timestamp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Name,
    LastUpdate,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Name, SortKey::LastUpdate, SortKey::Status];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::LastUpdate => "last_update",
            SortKey::Status => "status",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::LastUpdate => "Last update",
            SortKey::Status => "Status",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown sort key: {}", s))
    }
}

/// What the operator asked to see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub keyword: String,
    /// Empty means every status.
    pub statuses: BTreeSet<DeviceStatus>,
    /// Empty means every group.
    pub groups: BTreeSet<i64>,
    pub sort: SortKey,
    pub map_bounds_only: bool,
}

impl FilterCriteria {
    /// Whether any attribute-based criterion is active.
    pub fn narrows(&self) -> bool {
        !self.keyword.trim().is_empty() || !self.statuses.is_empty() || !self.groups.is_empty()
    }

    pub fn toggle_status(&mut self, status: DeviceStatus) {
        if !self.statuses.remove(&status) {
            self.statuses.insert(status);
        }
    }

    pub fn toggle_group(&mut self, group: i64) {
        if !self.groups.remove(&group) {
            self.groups.insert(group);
        }
    }

    fn matches(&self, device: &Device) -> bool {
        let keyword = self.keyword.trim().to_lowercase();
        if !keyword.is_empty()
            && !device.name.to_lowercase().contains(&keyword)
            && !device.unique_id.to_lowercase().contains(&keyword)
        {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&device.status) {
            return false;
        }
        if !self.groups.is_empty() {
            match device.group_id {
                Some(g) if self.groups.contains(&g) => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredFleet {
    pub devices: Vec<Device>,
    pub positions: Vec<Position>,
}

/// Derive the visible devices and positions.
///
/// `bounds` is the geographic area currently on screen; it only applies when
/// `criteria.map_bounds_only` is set.
pub fn apply_filter(
    criteria: &FilterCriteria,
    snapshot: &FleetSnapshot,
    bounds: Option<&GeoBounds>,
) -> FilteredFleet {
    let bounds = bounds.filter(|_| criteria.map_bounds_only);
    let in_bounds = |p: &Position| bounds.map_or(true, |b| b.contains(p.latitude, p.longitude));

    let mut devices: Vec<Device> = snapshot
        .devices
        .iter()
        .filter(|d| criteria.matches(d))
        .filter(|d| match bounds {
            Some(_) => snapshot.position_for(d.key()).is_some_and(in_bounds),
            None => true,
        })
        .cloned()
        .collect();
    sort_devices(&mut devices, criteria.sort);

    let kept: HashSet<DeviceKey> = devices.iter().map(|d| d.key()).collect();
    let positions = snapshot
        .positions
        .iter()
        .filter(|p| match snapshot.resolve(*p) {
            Some(d) => kept.contains(&d.key()),
            None => !criteria.narrows() && in_bounds(*p),
        })
        .cloned()
        .collect();

    FilteredFleet { devices, positions }
}

pub fn sort_devices(devices: &mut [Device], key: SortKey) {
    match key {
        SortKey::Name => devices.sort_by(compare_name),
        SortKey::LastUpdate => devices.sort_by(|a, b| {
            let ta = a.last_update.as_deref().and_then(parse_timestamp);
            let tb = b.last_update.as_deref().and_then(parse_timestamp);
            match (ta, tb) {
                (Some(ta), Some(tb)) => tb.cmp(&ta).then_with(|| compare_name(a, b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => compare_name(a, b),
            }
        }),
        SortKey::Status => devices.sort_by(|a, b| {
            a.status
                .rank()
                .cmp(&b.status.rank())
                .then_with(|| compare_name(a, b))
        }),
    }
}

fn compare_name(a: &Device, b: &Device) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.key().cmp(&b.key()))
}
