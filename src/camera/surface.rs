use crate::config::CameraConfig;
use crate::error::CameraError;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::device::{CameraDevice, FacingMode, StreamRequest, VideoStream};

/// Which surface the user sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Live camera feed with the shutter visible
    Live,
    /// Captured raster under review
    Frozen,
}

/// Source rectangle cut from a video frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Center-crop a `video` frame so its aspect ratio matches the `target` surface.
///
/// The longer video dimension (relative to the target ratio) is trimmed evenly
/// from both sides.
pub fn crop_region(video: (u32, u32), target: (u32, u32)) -> CropRegion {
    let (vw, vh) = (video.0 as f64, video.1 as f64);
    let target_ratio = target.0 as f64 / target.1 as f64;
    let video_ratio = vw / vh;

    if video_ratio > target_ratio {
        let width = (vh * target_ratio).round().min(vw);
        CropRegion {
            x: ((vw - width) / 2.0).round() as u32,
            y: 0,
            width: width.max(1.0) as u32,
            height: video.1,
        }
    } else {
        let height = (vw / target_ratio).round().min(vh);
        CropRegion {
            x: 0,
            y: ((vh - height) / 2.0).round() as u32,
            width: video.0,
            height: height.max(1.0) as u32,
        }
    }
}

/// Owns the live camera stream and produces the base raster of a capture
pub struct CaptureSurface {
    config: CameraConfig,
    device: Arc<dyn CameraDevice>,
    stream: Option<Box<dyn VideoStream>>,
    facing: FacingMode,
    display_size: (u32, u32),
    view: ViewMode,
}

impl CaptureSurface {
    pub fn new(config: CameraConfig, device: Arc<dyn CameraDevice>, display_size: (u32, u32)) -> Self {
        let facing = config.facing_mode;
        Self {
            config,
            device,
            stream: None,
            facing,
            display_size: (display_size.0.max(1), display_size.1.max(1)),
            view: ViewMode::Frozen,
        }
    }

    /// Open a stream for `facing`, stopping any previous one first.
    ///
    /// Upgrading to the device's maximum native resolution is best-effort.
    pub async fn start(&mut self, facing: FacingMode) -> Result<(u32, u32), CameraError> {
        self.stop();
        self.facing = facing;

        let request = StreamRequest {
            facing,
            ideal_resolution: self.config.ideal_resolution,
        };

        info!(
            "Starting {} camera stream (facing {}, ideal {}x{})",
            self.device.name(),
            facing,
            request.ideal_resolution.0,
            request.ideal_resolution.1
        );

        let mut stream = self.device.open(&request).await?;

        if let Some((max_w, max_h)) = stream.max_resolution() {
            if (max_w, max_h) != stream.resolution() {
                if let Err(e) = stream.apply_resolution(max_w, max_h).await {
                    warn!("Resolution upgrade to {}x{} skipped: {}", max_w, max_h, e);
                }
            }
        }

        let resolution = stream.resolution();
        info!(
            "Active camera resolution = {}x{}, facing mode = {}",
            resolution.0, resolution.1, facing
        );

        self.stream = Some(stream);
        self.view = ViewMode::Live;
        Ok(resolution)
    }

    /// Stop all tracks of the active stream, if any
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Camera stream stopped");
        }
    }

    /// Capture the current frame, center-cropped to the displayed box and
    /// mirrored for the user-facing lens.
    ///
    /// Waits for the first decodable frame, polling at a fixed delay up to
    /// the configured attempt limit.
    pub async fn capture(&mut self) -> Result<RgbaImage, CameraError> {
        let delay = Duration::from_millis(self.config.frame_retry_delay_ms);
        let limit = self.config.frame_retry_limit;
        let (width, height) = self.display_size;

        let stream = self.stream.as_mut().ok_or(CameraError::NotStarted)?;

        let mut attempts = 0;
        let frame = loop {
            if let Some(frame) = stream.read_frame() {
                break frame;
            }
            attempts += 1;
            if attempts >= limit {
                warn!("No decodable frame after {} attempts", attempts);
                return Err(CameraError::FrameTimeout { attempts });
            }
            debug!("Video frame not ready, retrying in {:?}", delay);
            tokio::time::sleep(delay).await;
        };

        let region = crop_region(frame.dimensions(), (width, height));
        debug!(
            "Cropping {}x{} frame to {:?} for {}x{} surface",
            frame.width(),
            frame.height(),
            region,
            width,
            height
        );

        let cropped = imageops::crop_imm(&frame, region.x, region.y, region.width, region.height)
            .to_image();
        let mut raster = if cropped.dimensions() == (width, height) {
            cropped
        } else {
            imageops::resize(&cropped, width, height, FilterType::Triangle)
        };

        if self.facing.is_mirrored() {
            imageops::flip_horizontal_in_place(&mut raster);
        }

        Ok(raster)
    }

    /// Track the displayed size of the camera feed in CSS pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        self.display_size = (width.max(1), height.max(1));
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn is_mirrored(&self) -> bool {
        self.facing.is_mirrored()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.as_ref().map(|s| s.is_active()).unwrap_or(false)
    }

    pub fn stream_resolution(&self) -> Option<(u32, u32)> {
        self.stream.as_ref().map(|s| s.resolution())
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn set_view_mode(&mut self, view: ViewMode) {
        self.view = view;
    }
}

impl Drop for CaptureSurface {
    fn drop(&mut self) {
        self.stop();
    }
}
