use crate::config::CameraConfig;
use crate::error::CameraError;
use async_trait::async_trait;
use gstreamer::prelude::*;
use gstreamer::Pipeline;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, info, trace, warn};

use super::device::{CameraDevice, FacingMode, StreamRequest, VideoStream};

/// V4L2 camera driven through a GStreamer pipeline
pub struct GstCameraDevice {
    config: CameraConfig,
}

impl GstCameraDevice {
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        gstreamer::init().map_err(|e| CameraError::Configuration {
            details: format!("Failed to initialize GStreamer: {}", e),
        })?;
        Ok(Self { config })
    }

    fn device_path(&self, facing: FacingMode) -> String {
        let index = match facing {
            FacingMode::Environment => self.config.environment_device,
            FacingMode::User => self.config.user_device,
        };
        format!("/dev/video{}", index)
    }

    fn check_device(device: &str) -> Result<(), CameraError> {
        if !Path::new(device).exists() {
            return Err(CameraError::NotFound {
                device: device.to_string(),
            });
        }
        std::fs::OpenOptions::new()
            .read(true)
            .open(device)
            .map(|_| ())
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => CameraError::PermissionDenied,
                std::io::ErrorKind::NotFound => CameraError::NotFound {
                    device: device.to_string(),
                },
                _ => CameraError::Stream {
                    details: format!("Failed to open {}: {}", device, e),
                },
            })
    }

    fn build_pipeline_string(device: &str) -> String {
        format!(
            "v4l2src name=src device={} ! \
             capsfilter name=res ! \
             videoconvert ! video/x-raw,format=RGBA ! \
             appsink name=sink sync=false max-buffers=1 drop=true enable-last-sample=false",
            device
        )
    }
}

#[async_trait]
impl CameraDevice for GstCameraDevice {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, CameraError> {
        let device = self.device_path(request.facing);
        Self::check_device(&device)?;

        let pipeline_desc = Self::build_pipeline_string(&device);
        info!("Creating GStreamer pipeline: {}", pipeline_desc);

        let pipeline = gstreamer::parse::launch(&pipeline_desc)
            .map_err(|e| CameraError::Configuration {
                details: format!("Failed to create pipeline: {}", e),
            })?
            .downcast::<Pipeline>()
            .map_err(|_| CameraError::Configuration {
                details: "Failed to downcast to Pipeline".to_string(),
            })?;

        let appsink = pipeline
            .by_name("sink")
            .and_then(|sink| sink.downcast::<AppSink>().ok())
            .ok_or_else(|| CameraError::Configuration {
                details: "Pipeline has no appsink".to_string(),
            })?;

        // Probing device caps only works once the source has opened the device
        pipeline
            .set_state(gstreamer::State::Ready)
            .map_err(|e| CameraError::Stream {
                details: format!("Failed to open {}: {}", device, e),
            })?;
        let max_resolution = probe_max_resolution(&pipeline);
        debug!("Probed max resolution for {}: {:?}", device, max_resolution);

        let (ideal_w, ideal_h) = request.ideal_resolution;
        let mut stream = GstVideoStream {
            pipeline,
            appsink,
            resolution: (ideal_w, ideal_h),
            max_resolution,
            last_frame: None,
            active: false,
        };

        let initial = match max_resolution {
            Some((w, h)) => (w.min(ideal_w), h.min(ideal_h)),
            None => (ideal_w, ideal_h),
        };
        stream.set_resolution_caps(initial.0, initial.1);
        stream.play()?;
        stream.resolution = initial;

        Ok(Box::new(stream))
    }

    fn name(&self) -> &str {
        "v4l2"
    }
}

fn probe_max_resolution(pipeline: &Pipeline) -> Option<(u32, u32)> {
    let src = pipeline.by_name("src")?;
    let pad = src.static_pad("src")?;
    let caps = pad.query_caps(None);

    caps.iter()
        .filter_map(|s| {
            let width = s.get::<i32>("width").ok()?;
            let height = s.get::<i32>("height").ok()?;
            Some((width.max(0) as u32, height.max(0) as u32))
        })
        .max_by_key(|(w, h)| (*w as u64) * (*h as u64))
}

struct GstVideoStream {
    pipeline: Pipeline,
    appsink: AppSink,
    resolution: (u32, u32),
    max_resolution: Option<(u32, u32)>,
    last_frame: Option<RgbaImage>,
    active: bool,
}

impl GstVideoStream {
    fn set_resolution_caps(&self, width: u32, height: u32) {
        if let Some(filter) = self.pipeline.by_name("res") {
            let caps = gstreamer::Caps::builder("video/x-raw")
                .field("width", width as i32)
                .field("height", height as i32)
                .build();
            filter.set_property("caps", &caps);
        }
    }

    fn play(&mut self) -> Result<(), CameraError> {
        self.pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| CameraError::Stream {
                details: format!("Failed to start GStreamer pipeline: {}", e),
            })?;
        self.active = true;
        Ok(())
    }

    fn sample_to_image(sample: &gstreamer::Sample) -> Option<RgbaImage> {
        let buffer = sample.buffer()?;
        let caps = sample.caps()?;
        let info = VideoInfo::from_caps(caps).ok()?;
        let map = buffer.map_readable().ok()?;

        let width = info.width();
        let height = info.height();
        let stride = info.stride()[0] as usize;
        let row_bytes = width as usize * 4;
        let data = map.as_slice();

        let pixels = if stride == row_bytes {
            data.get(..row_bytes * height as usize)?.to_vec()
        } else {
            let mut pixels = Vec::with_capacity(row_bytes * height as usize);
            for row in 0..height as usize {
                let start = row * stride;
                pixels.extend_from_slice(data.get(start..start + row_bytes)?);
            }
            pixels
        };

        RgbaImage::from_raw(width, height, pixels)
    }
}

#[async_trait]
impl VideoStream for GstVideoStream {
    fn max_resolution(&self) -> Option<(u32, u32)> {
        self.max_resolution
    }

    async fn apply_resolution(&mut self, width: u32, height: u32) -> Result<(), CameraError> {
        info!("Renegotiating camera resolution to {}x{}", width, height);
        let _ = self.pipeline.set_state(gstreamer::State::Ready);
        self.set_resolution_caps(width, height);
        self.last_frame = None;

        if let Err(e) = self.play() {
            let (prev_w, prev_h) = self.resolution;
            warn!("Renegotiation failed, restoring {}x{}", prev_w, prev_h);
            let _ = self.pipeline.set_state(gstreamer::State::Ready);
            self.set_resolution_caps(prev_w, prev_h);
            self.play()?;
            return Err(e);
        }

        self.resolution = (width, height);
        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn read_frame(&mut self) -> Option<RgbaImage> {
        if !self.active {
            return None;
        }

        if let Some(sample) = self.appsink.try_pull_sample(gstreamer::ClockTime::ZERO) {
            if let Some(frame) = Self::sample_to_image(&sample) {
                trace!("Pulled {}x{} frame", frame.width(), frame.height());
                self.resolution = frame.dimensions();
                self.last_frame = Some(frame);
            }
        }

        self.last_frame.clone()
    }

    fn stop(&mut self) {
        if self.active {
            let _ = self.pipeline.set_state(gstreamer::State::Null);
            self.active = false;
            info!("GStreamer camera pipeline stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for GstVideoStream {
    fn drop(&mut self) {
        self.stop();
    }
}
