use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Free-form attribute bag attached to devices and positions.
pub type Attributes = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DeviceStatus {
    pub const ALL: [DeviceStatus; 3] = [
        DeviceStatus::Online,
        DeviceStatus::Offline,
        DeviceStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Unknown => "unknown",
        }
    }

    /// Position of the status in the status sort order.
    pub fn rank(&self) -> u8 {
        match self {
            DeviceStatus::Online => 0,
            DeviceStatus::Offline => 1,
            DeviceStatus::Unknown => 2,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "Online"),
            DeviceStatus::Offline => write!(f, "Offline"),
            DeviceStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Identity of a device in the merged list.
///
/// Registered and unknown devices live in separate id spaces upstream, so the
/// key keeps them apart: `Registered(1)` and `Unknown(1)` are different devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKey {
    Registered(i64),
    Unknown(i64),
}

impl DeviceKey {
    pub fn id(&self) -> i64 {
        match self {
            DeviceKey::Registered(id) | DeviceKey::Unknown(id) => *id,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DeviceKey::Unknown(_))
    }
}

/// Rendered as `device-<id>` or `unknown-<id>`; used for DOM keys and routes.
impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKey::Registered(id) => write!(f, "device-{}", id),
            DeviceKey::Unknown(id) => write!(f, "unknown-{}", id),
        }
    }
}

impl FromStr for DeviceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid device key: {}", s))?;
        let id: i64 = id
            .parse()
            .map_err(|_| format!("Invalid device key: {}", s))?;
        match kind {
            "device" => Ok(DeviceKey::Registered(id)),
            "unknown" => Ok(DeviceKey::Unknown(id)),
            _ => Err(format!("Invalid device key: {}", s)),
        }
    }
}

/// A tracked asset. Unknown devices are synthesized into this same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub unique_id: String,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub is_unknown: bool,
}

impl Device {
    pub fn key(&self) -> DeviceKey {
        if self.is_unknown {
            DeviceKey::Unknown(self.id)
        } else {
            DeviceKey::Registered(self.id)
        }
    }
}

/// Record returned by `GET /api/unknown-devices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownDeviceRecord {
    pub id: i64,
    pub unique_id: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// Raw record from `GET /api/positions/latest`. Field naming varies by source:
/// the device reference arrives as `device_id` or `unknown_device_id`, the
/// timestamp as `server_time`, `device_time` or `fix_time`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub device_id: Option<i64>,
    #[serde(default)]
    pub unknown_device_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub course: Option<f64>,
    #[serde(default)]
    pub server_time: Option<String>,
    #[serde(default)]
    pub device_time: Option<String>,
    #[serde(default)]
    pub fix_time: Option<String>,
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub protocol: Option<String>,
    /// Geofences the report falls inside, as evaluated upstream.
    #[serde(default)]
    pub geofence_ids: Vec<i64>,
    #[serde(default)]
    pub attributes: Attributes,
}

/// A normalized location report.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub id: Option<i64>,
    /// `None` when the record carried neither device id.
    pub device: Option<DeviceKey>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub course: Option<f64>,
    pub time: Option<String>,
    pub valid: bool,
    pub protocol: String,
    pub geofence_ids: Vec<i64>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Merged devices and normalized positions from one load cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetSnapshot {
    pub devices: Vec<Device>,
    pub positions: Vec<Position>,
}

impl FleetSnapshot {
    pub fn device(&self, key: DeviceKey) -> Option<&Device> {
        self.devices.iter().find(|d| d.key() == key)
    }

    /// Latest position for a device. When several records reference the same
    /// device, the last one in the payload wins.
    pub fn position_for(&self, key: DeviceKey) -> Option<&Position> {
        self.positions
            .iter()
            .rev()
            .find(|p| p.device == Some(key))
    }

    /// Device a position belongs to, if it is present in the merged list.
    pub fn resolve(&self, position: &Position) -> Option<&Device> {
        position.device.and_then(|key| self.device(key))
    }

    /// Positions whose device reference does not resolve to a listed device.
    pub fn unlinked_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| self.resolve(p).is_none())
    }

    /// Devices whose latest position lies inside the geofence.
    pub fn devices_in_geofence(&self, geofence_id: i64) -> Vec<DeviceKey> {
        self.devices
            .iter()
            .map(|d| d.key())
            .filter(|key| {
                self.position_for(*key)
                    .is_some_and(|p| p.geofence_ids.contains(&geofence_id))
            })
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for device in &self.devices {
            match device.status {
                DeviceStatus::Online => counts.online += 1,
                DeviceStatus::Offline => counts.offline += 1,
                DeviceStatus::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub online: usize,
    pub offline: usize,
    pub unknown: usize,
}
