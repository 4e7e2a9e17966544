use crate::models::{
    Device, DeviceKey, DeviceStatus, FleetSnapshot, Position, PositionRecord, UnknownDeviceRecord,
};

/// Protocol recorded on positions that arrive without one.
pub const UNKNOWN_PROTOCOL: &str = "unknown";

/// Category given to synthesized unknown devices.
pub const UNKNOWN_CATEGORY: &str = "unknown";

impl From<UnknownDeviceRecord> for Device {
    fn from(record: UnknownDeviceRecord) -> Self {
        Device {
            id: record.id,
            name: format!("Unknown {}", record.unique_id),
            unique_id: record.unique_id,
            status: DeviceStatus::Unknown,
            category: Some(UNKNOWN_CATEGORY.to_string()),
            last_update: record.last_seen,
            group_id: None,
            disabled: false,
            protocol: record.protocol,
            attributes: Default::default(),
            is_unknown: true,
        }
    }
}

impl From<PositionRecord> for Position {
    fn from(record: PositionRecord) -> Self {
        let device = match (record.device_id, record.unknown_device_id) {
            (Some(id), _) => Some(DeviceKey::Registered(id)),
            (None, Some(id)) => Some(DeviceKey::Unknown(id)),
            (None, None) => None,
        };
        Position {
            id: record.id,
            device,
            latitude: record.latitude,
            longitude: record.longitude,
            altitude: record.altitude,
            speed: record.speed,
            course: record.course,
            time: record.server_time.or(record.device_time).or(record.fix_time),
            valid: record.valid != Some(false),
            protocol: record
                .protocol
                .unwrap_or_else(|| UNKNOWN_PROTOCOL.to_string()),
            geofence_ids: record.geofence_ids,
            attributes: record.attributes,
        }
    }
}

/// Concatenate registered devices with converted unknown devices, registered first.
pub fn merge_devices(devices: Vec<Device>, unknown: Vec<UnknownDeviceRecord>) -> Vec<Device> {
    let mut merged = devices;
    merged.extend(unknown.into_iter().map(Device::from));
    merged
}

/// Build a snapshot from the three reads. `unknown` is `None` when that read
/// failed; registered devices still render in that case.
pub fn assemble_snapshot(
    devices: Vec<Device>,
    unknown: Option<Vec<UnknownDeviceRecord>>,
    positions: Vec<PositionRecord>,
) -> FleetSnapshot {
    FleetSnapshot {
        devices: merge_devices(devices, unknown.unwrap_or_default()),
        positions: positions.into_iter().map(Position::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: i64, name: &str) -> Device {
        Device {
            id,
            name: name.to_string(),
            unique_id: format!("imei-{}", id),
            status: DeviceStatus::Online,
            category: None,
            last_update: None,
            group_id: None,
            disabled: false,
            protocol: None,
            attributes: Default::default(),
            is_unknown: false,
        }
    }

    fn record(json: &str) -> PositionRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_unknown_device_conversion() {
        let unknown = UnknownDeviceRecord {
            id: 1,
            unique_id: "X".to_string(),
            protocol: Some("p".to_string()),
            last_seen: Some("T".to_string()),
        };
        let d = Device::from(unknown);
        assert_eq!(d.name, "Unknown X");
        assert_eq!(d.category.as_deref(), Some("unknown"));
        assert!(d.is_unknown);
        assert_eq!(d.last_update.as_deref(), Some("T"));
        assert_eq!(d.protocol.as_deref(), Some("p"));
        assert_eq!(d.status, DeviceStatus::Unknown);
        assert_eq!(d.key(), DeviceKey::Unknown(1));
    }

    #[test]
    fn test_merge_keeps_registered_first() {
        let merged = merge_devices(
            vec![device(1, "A"), device(2, "B")],
            vec![UnknownDeviceRecord {
                id: 1,
                unique_id: "Z".to_string(),
                protocol: None,
                last_seen: None,
            }],
        );
        let keys: Vec<DeviceKey> = merged.iter().map(|d| d.key()).collect();
        assert_eq!(
            keys,
            vec![
                DeviceKey::Registered(1),
                DeviceKey::Registered(2),
                DeviceKey::Unknown(1)
            ]
        );
    }

    #[test]
    fn test_failed_unknown_read_keeps_registered_devices() {
        let registered = vec![device(1, "A"), device(2, "B")];
        let snapshot = assemble_snapshot(
            registered.clone(),
            None,
            vec![record(r#"{"device_id":1,"latitude":1.0,"longitude":2.0}"#)],
        );
        assert_eq!(snapshot.devices, registered);
        assert_eq!(snapshot.positions.len(), 1);
    }

    #[test]
    fn test_position_prefers_device_id() {
        let p = Position::from(record(
            r#"{"device_id":4,"unknown_device_id":9,"latitude":0.0,"longitude":0.0}"#,
        ));
        assert_eq!(p.device, Some(DeviceKey::Registered(4)));
    }

    #[test]
    fn test_position_falls_back_to_unknown_device_id() {
        let p = Position::from(record(
            r#"{"unknown_device_id":9,"latitude":0.0,"longitude":0.0}"#,
        ));
        assert_eq!(p.device, Some(DeviceKey::Unknown(9)));
        assert_eq!(p.device.map(|k| k.id()), Some(9));
    }

    #[test]
    fn test_position_without_any_device_reference() {
        let p = Position::from(record(r#"{"latitude":0.0,"longitude":0.0}"#));
        assert_eq!(p.device, None);
    }

    #[test]
    fn test_position_time_first_non_null_wins() {
        let p = Position::from(record(
            r#"{"device_id":1,"latitude":0.0,"longitude":0.0,"server_time":null,"device_time":"D","fix_time":"F"}"#,
        ));
        assert_eq!(p.time.as_deref(), Some("D"));

        let p = Position::from(record(
            r#"{"device_id":1,"latitude":0.0,"longitude":0.0,"server_time":"S","device_time":"D"}"#,
        ));
        assert_eq!(p.time.as_deref(), Some("S"));
    }

    #[test]
    fn test_position_valid_defaults_true() {
        let p = Position::from(record(r#"{"device_id":1,"latitude":0.0,"longitude":0.0}"#));
        assert!(p.valid);
        let p = Position::from(record(
            r#"{"device_id":1,"latitude":0.0,"longitude":0.0,"valid":null}"#,
        ));
        assert!(p.valid);
    }

    #[test]
    fn test_position_valid_false_is_kept() {
        let p = Position::from(record(
            r#"{"device_id":1,"latitude":0.0,"longitude":0.0,"valid":false}"#,
        ));
        assert!(!p.valid);
    }

    #[test]
    fn test_position_protocol_defaults_to_unknown() {
        let p = Position::from(record(r#"{"device_id":1,"latitude":0.0,"longitude":0.0}"#));
        assert_eq!(p.protocol, "unknown");
        let p = Position::from(record(
            r#"{"device_id":1,"latitude":0.0,"longitude":0.0,"protocol":"osmand"}"#,
        ));
        assert_eq!(p.protocol, "osmand");
    }

    #[test]
    fn test_devices_in_geofence_uses_latest_position() {
        let snapshot = assemble_snapshot(
            vec![device(1, "A"), device(2, "B")],
            None,
            vec![
                record(r#"{"device_id":1,"latitude":1.0,"longitude":1.0,"geofence_ids":[5]}"#),
                record(r#"{"device_id":2,"latitude":1.0,"longitude":1.0,"geofence_ids":[5]}"#),
                record(r#"{"device_id":2,"latitude":2.0,"longitude":2.0}"#),
            ],
        );
        assert_eq!(snapshot.devices_in_geofence(5), vec![DeviceKey::Registered(1)]);
        assert!(snapshot.devices_in_geofence(6).is_empty());
    }

    #[test]
    fn test_unlinked_position_is_kept_without_device() {
        // Unknown-device read failed but positions still reference an unknown device.
        let snapshot = assemble_snapshot(
            vec![device(1, "A")],
            None,
            vec![
                record(r#"{"device_id":1,"latitude":1.0,"longitude":1.0}"#),
                record(r#"{"unknown_device_id":3,"latitude":2.0,"longitude":2.0}"#),
            ],
        );
        assert_eq!(snapshot.positions.len(), 2);
        let unlinked: Vec<&Position> = snapshot.unlinked_positions().collect();
        assert_eq!(unlinked.len(), 1);
        assert_eq!(unlinked[0].device, Some(DeviceKey::Unknown(3)));
        assert!(snapshot.resolve(&snapshot.positions[0]).is_some());
    }
}
