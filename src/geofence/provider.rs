use crate::error::LocationError;
use async_trait::async_trait;
use std::time::Duration;

/// A single device position fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Options for a single-shot position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the provider may return; zero forces a fresh fix
    pub maximum_age: Duration,
}

impl PositionRequest {
    /// High-accuracy fresh fix bounded by `timeout`
    pub fn fresh(timeout: Duration) -> Self {
        Self {
            high_accuracy: true,
            timeout,
            maximum_age: Duration::ZERO,
        }
    }
}

/// Source of device positions
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self, request: &PositionRequest) -> Result<Position, LocationError>;
}

/// Provider for installations with a known, fixed position
#[derive(Debug, Clone)]
pub struct FixedLocation {
    position: Position,
}

impl FixedLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Position::new(latitude, longitude),
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self, _request: &PositionRequest) -> Result<Position, LocationError> {
        Ok(self.position)
    }
}

/// Provider for hosts without any location service
#[derive(Debug, Clone, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self, _request: &PositionRequest) -> Result<Position, LocationError> {
        Err(LocationError::Unsupported)
    }
}
