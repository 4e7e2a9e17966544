pub mod endpoints;
pub mod error;
pub mod events;
pub mod filter;
pub mod fleet;
pub mod geo;
pub mod layout;
pub mod models;
pub mod normalize;
pub mod session;
pub mod time;

pub use error::ApiError;
pub use models::{Device, DeviceKey, DeviceStatus, FleetSnapshot, Position};
