//! Paths of the upstream fleet API, relative to the console origin.

/// Prefix the console server forwards to the upstream API.
pub const API_PREFIX: &str = "/api";

pub const LOGIN: &str = "/api/auth/login";
pub const DEVICES: &str = "/api/devices";
pub const UNKNOWN_DEVICES: &str = "/api/unknown-devices";
pub const POSITIONS_LATEST: &str = "/api/positions/latest";

/// Delay between background reloads of the snapshot.
pub const REFRESH_INTERVAL_MS: u32 = 30_000;
