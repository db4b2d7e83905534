use crate::config::GeofenceConfig;
use crate::error::{LocationError, UserMessage};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::distance::distance_in_meters;
use super::provider::{LocationProvider, PositionRequest};

/// Why the gate refused access
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDenial {
    PermissionDenied,
    Unsupported,
    NoSignal,
    Timeout,
    OutsideArea { distance_meters: f64 },
    Unknown,
}

impl AccessDenial {
    pub fn message(&self) -> String {
        match self {
            AccessDenial::PermissionDenied => LocationError::PermissionDenied.user_message(),
            AccessDenial::Unsupported => LocationError::Unsupported.user_message(),
            AccessDenial::NoSignal => LocationError::PositionUnavailable.user_message(),
            AccessDenial::Timeout => LocationError::Timeout.user_message(),
            AccessDenial::OutsideArea { .. } => {
                "This service is not available outside the designated area.".to_string()
            }
            AccessDenial::Unknown => LocationError::Unknown {
                details: String::new(),
            }
            .user_message(),
        }
    }
}

impl From<&LocationError> for AccessDenial {
    fn from(error: &LocationError) -> Self {
        match error {
            LocationError::PermissionDenied => AccessDenial::PermissionDenied,
            LocationError::Unsupported => AccessDenial::Unsupported,
            LocationError::PositionUnavailable => AccessDenial::NoSignal,
            LocationError::Timeout => AccessDenial::Timeout,
            LocationError::Unknown { .. } => AccessDenial::Unknown,
        }
    }
}

/// Outcome of a single access check
#[derive(Debug, Clone, PartialEq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub denial: Option<AccessDenial>,
}

impl AccessDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            denial: None,
        }
    }

    fn deny(denial: AccessDenial) -> Self {
        Self {
            allowed: false,
            denial: Some(denial),
        }
    }

    /// Modal text for a refused check
    pub fn message(&self) -> Option<String> {
        self.denial.as_ref().map(AccessDenial::message)
    }
}

/// Optional circular-area check gating the rest of the app
pub struct GeoFenceGate {
    config: GeofenceConfig,
    provider: Arc<dyn LocationProvider>,
}

impl GeoFenceGate {
    pub fn new(config: GeofenceConfig, provider: Arc<dyn LocationProvider>) -> Self {
        Self { config, provider }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Check whether the device may use the app. Never retries.
    pub async fn check_access(&self) -> AccessDecision {
        if !self.config.enabled {
            info!("Geofence check disabled, access allowed");
            return AccessDecision::allow();
        }

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let request = PositionRequest::fresh(timeout);

        let position =
            match tokio::time::timeout(timeout, self.provider.current_position(&request)).await {
                Ok(Ok(position)) => position,
                Ok(Err(e)) => {
                    warn!("Location fix failed: {}", e);
                    return AccessDecision::deny(AccessDenial::from(&e));
                }
                Err(_) => {
                    warn!("Location fix timed out after {:?}", timeout);
                    return AccessDecision::deny(AccessDenial::Timeout);
                }
            };

        debug!(
            "Location fix: lat={}, lng={}",
            position.latitude, position.longitude
        );

        let distance = distance_in_meters(
            position.latitude,
            position.longitude,
            self.config.latitude,
            self.config.longitude,
        );
        info!("Distance to allowed area: {:.2} m", distance);

        if distance <= self.config.radius_meters {
            info!("Device is inside the allowed area");
            AccessDecision::allow()
        } else {
            info!(
                "Device is outside the allowed area ({:.2} m > {:.2} m)",
                distance, self.config.radius_meters
            );
            AccessDecision::deny(AccessDenial::OutsideArea {
                distance_meters: distance,
            })
        }
    }
}
