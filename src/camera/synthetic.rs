use crate::error::CameraError;
use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::device::{CameraDevice, StreamRequest, VideoStream};

/// Camera producing a two-tone test pattern, for hosts without capture hardware
#[derive(Clone)]
pub struct SyntheticCamera {
    native_resolution: (u32, u32),
    max_resolution: Option<(u32, u32)>,
    warmup_reads: u32,
    failure: Option<CameraError>,
    reject_upgrade: bool,
    active_streams: Arc<AtomicUsize>,
    opened_streams: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<StreamRequest>>>,
}

impl SyntheticCamera {
    /// Color of the left half of every frame
    pub const LEFT_COLOR: Rgba<u8> = Rgba([32, 96, 160, 255]);
    /// Color of the right half of every frame
    pub const RIGHT_COLOR: Rgba<u8> = Rgba([32, 160, 96, 255]);

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            native_resolution: (width, height),
            max_resolution: None,
            warmup_reads: 0,
            failure: None,
            reject_upgrade: false,
            active_streams: Arc::new(AtomicUsize::new(0)),
            opened_streams: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Report a larger native resolution that streams may be upgraded to
    pub fn with_max_resolution(mut self, width: u32, height: u32) -> Self {
        self.max_resolution = Some((width, height));
        self
    }

    /// Return no frame for the first `reads` reads of each stream
    pub fn with_warmup(mut self, reads: u32) -> Self {
        self.warmup_reads = reads;
        self
    }

    /// Fail every `open` with the given error
    pub fn with_failure(mut self, error: CameraError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Refuse resolution upgrades
    pub fn rejecting_upgrades(mut self) -> Self {
        self.reject_upgrade = true;
        self
    }

    /// Streams opened and not yet stopped
    pub fn active_streams(&self) -> usize {
        self.active_streams.load(Ordering::SeqCst)
    }

    /// Streams opened over the camera's lifetime
    pub fn opened_streams(&self) -> usize {
        self.opened_streams.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<StreamRequest> {
        self.last_request.lock().ok().and_then(|request| *request)
    }
}

#[async_trait]
impl CameraDevice for SyntheticCamera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(*request);
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        self.active_streams.fetch_add(1, Ordering::SeqCst);
        self.opened_streams.fetch_add(1, Ordering::SeqCst);
        info!(
            "Synthetic camera stream opened ({}x{}, facing {})",
            self.native_resolution.0, self.native_resolution.1, request.facing
        );

        Ok(Box::new(SyntheticStream {
            resolution: self.native_resolution,
            max_resolution: self.max_resolution,
            warmup_remaining: self.warmup_reads,
            reject_upgrade: self.reject_upgrade,
            frame: None,
            active: AtomicBool::new(true),
            active_streams: Arc::clone(&self.active_streams),
        }))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct SyntheticStream {
    resolution: (u32, u32),
    max_resolution: Option<(u32, u32)>,
    warmup_remaining: u32,
    reject_upgrade: bool,
    frame: Option<RgbaImage>,
    active: AtomicBool,
    active_streams: Arc<AtomicUsize>,
}

impl SyntheticStream {
    fn pattern(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                SyntheticCamera::LEFT_COLOR
            } else {
                SyntheticCamera::RIGHT_COLOR
            }
        })
    }
}

#[async_trait]
impl VideoStream for SyntheticStream {
    fn max_resolution(&self) -> Option<(u32, u32)> {
        self.max_resolution
    }

    async fn apply_resolution(&mut self, width: u32, height: u32) -> Result<(), CameraError> {
        if self.reject_upgrade {
            return Err(CameraError::Configuration {
                details: format!("{}x{} not supported", width, height),
            });
        }
        self.resolution = (width, height);
        self.frame = None;
        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn read_frame(&mut self) -> Option<RgbaImage> {
        if !self.is_active() {
            return None;
        }

        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            debug!("Synthetic stream warming up ({} reads left)", self.warmup_remaining);
            return None;
        }

        let (width, height) = self.resolution;
        Some(
            self.frame
                .get_or_insert_with(|| Self::pattern(width, height))
                .clone(),
        )
    }

    fn stop(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.active_streams.fetch_sub(1, Ordering::SeqCst);
            debug!("Synthetic camera stream stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
