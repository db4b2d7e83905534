mod distance;
mod gate;
mod provider;

pub use distance::{distance_in_meters, EARTH_RADIUS_METERS};
pub use gate::{AccessDecision, AccessDenial, GeoFenceGate};
pub use provider::{FixedLocation, LocationProvider, NoLocation, Position, PositionRequest};
