use dioxus::logger::tracing::{debug, warn};
use fleet_shared::endpoints;
use fleet_shared::error::ApiError;
use fleet_shared::models::{
    Device, FleetSnapshot, LoginRequest, LoginResponse, PositionRecord, UnknownDeviceRecord,
};
use fleet_shared::normalize::assemble_snapshot;
use serde::de::DeserializeOwned;

/// Join the page origin and an API path.
pub fn build_api_url(origin: &str, path: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), path)
}

fn api_url(path: &str) -> String {
    // The console server proxies /api, so the page origin is the API origin.
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default();
    build_api_url(&origin, path)
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::from_response(
            status.as_u16(),
            status.canonical_reason(),
            &body,
        ));
    }
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

async fn get_json<T: DeserializeOwned>(path: &str, token: &str) -> Result<T, ApiError> {
    let resp = reqwest::Client::new()
        .get(api_url(path))
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    read_json(resp).await
}

/// Exchange credentials for an access token.
pub async fn login(email: &str, password: &str) -> Result<String, ApiError> {
    let req = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let resp = reqwest::Client::new()
        .post(api_url(endpoints::LOGIN))
        .json(&req)
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let body: LoginResponse = read_json(resp).await?;
    Ok(body.access_token)
}

pub async fn fetch_devices(token: &str) -> Result<Vec<Device>, ApiError> {
    get_json(endpoints::DEVICES, token).await
}

pub async fn fetch_unknown_devices(token: &str) -> Result<Vec<UnknownDeviceRecord>, ApiError> {
    get_json(endpoints::UNKNOWN_DEVICES, token).await
}

pub async fn fetch_latest_positions(token: &str) -> Result<Vec<PositionRecord>, ApiError> {
    get_json(endpoints::POSITIONS_LATEST, token).await
}

/// Run the three reads in order and assemble a snapshot.
///
/// Devices and positions are mandatory. A failed unknown-device read is logged
/// and the snapshot is built from registered devices only.
pub async fn load_fleet(token: &str) -> Result<FleetSnapshot, ApiError> {
    let devices = fetch_devices(token).await?;
    let unknown = match fetch_unknown_devices(token).await {
        Ok(records) => Some(records),
        Err(e) => {
            warn!("Unknown devices unavailable, continuing without them: {:?}", e);
            None
        }
    };
    let positions = fetch_latest_positions(token).await?;

    let snapshot = assemble_snapshot(devices, unknown, positions);
    for position in snapshot.unlinked_positions() {
        debug!(
            "Position {:?} references {:?}, which is not in the device list",
            position.id, position.device
        );
    }
    Ok(snapshot)
}
