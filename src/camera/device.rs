use crate::error::CameraError;
use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Camera selection between the outward- and inward-facing lenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    Environment,
    User,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            FacingMode::Environment => FacingMode::User,
            FacingMode::User => FacingMode::Environment,
        }
    }

    /// The live feed and the captured raster are mirrored for the selfie lens
    pub fn is_mirrored(&self) -> bool {
        matches!(self, FacingMode::User)
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "environment" => Ok(FacingMode::Environment),
            "user" => Ok(FacingMode::User),
            other => Err(format!("unknown facing mode '{}'", other)),
        }
    }
}

/// Parameters for opening a live stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamRequest {
    pub facing: FacingMode,
    /// Resolution hint; the device grants whatever it supports
    pub ideal_resolution: (u32, u32),
}

/// A camera that can open live streams
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError>;

    fn name(&self) -> &str;
}

/// An open live stream. Dropping a stream without `stop` leaves tracks running
/// for backends with external pipelines, so owners stop explicitly.
#[async_trait]
pub trait VideoStream: Send {
    /// Largest native resolution the device reports, if it can be probed
    fn max_resolution(&self) -> Option<(u32, u32)>;

    /// Renegotiate the stream resolution
    async fn apply_resolution(&mut self, width: u32, height: u32) -> Result<(), CameraError>;

    /// Currently negotiated resolution
    fn resolution(&self) -> (u32, u32);

    /// Latest decoded frame, or `None` until the stream has produced one
    fn read_frame(&mut self) -> Option<RgbaImage>;

    /// Stop all tracks of this stream
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}
