use crate::config::FramesConfig;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Edge a decorative frame is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlacement {
    Top,
    Bottom,
}

/// Scale `frame` to the raster width (aspect preserved) and draw it flush to
/// the given edge.
pub fn draw_frame(raster: &mut RgbaImage, frame: &RgbaImage, placement: FramePlacement) {
    let (cw, ch) = raster.dimensions();
    let (iw, ih) = frame.dimensions();
    if iw == 0 || ih == 0 || cw == 0 {
        return;
    }

    let scale = cw as f64 / iw as f64;
    let draw_h = ((ih as f64 * scale).round() as u32).max(1);
    let scaled;
    let drawn = if (iw, ih) == (cw, draw_h) {
        frame
    } else {
        scaled = imageops::resize(frame, cw, draw_h, FilterType::Triangle);
        &scaled
    };

    let y = match placement {
        FramePlacement::Top => 0,
        FramePlacement::Bottom => ch as i64 - draw_h as i64,
    };
    imageops::overlay(raster, drawn, 0, y);
}

enum FrameSlot {
    Unconfigured,
    Loading(JoinHandle<Option<RgbaImage>>),
    Ready(Option<Arc<RgbaImage>>),
}

/// Draws the top and bottom decorative bitmaps onto a captured raster.
///
/// Bitmaps load in the background; `apply_frames` awaits both before drawing
/// and skips any that failed to load.
pub struct FrameCompositor {
    top_path: Option<PathBuf>,
    bottom_path: Option<PathBuf>,
    top: FrameSlot,
    bottom: FrameSlot,
}

impl FrameCompositor {
    pub fn new(config: &FramesConfig) -> Self {
        Self {
            top_path: config.top.as_ref().map(PathBuf::from),
            bottom_path: config.bottom.as_ref().map(PathBuf::from),
            top: FrameSlot::Unconfigured,
            bottom: FrameSlot::Unconfigured,
        }
    }

    /// Use already decoded bitmaps instead of loading from disk
    pub fn from_images(top: Option<RgbaImage>, bottom: Option<RgbaImage>) -> Self {
        Self {
            top_path: None,
            bottom_path: None,
            top: FrameSlot::Ready(top.map(Arc::new)),
            bottom: FrameSlot::Ready(bottom.map(Arc::new)),
        }
    }

    /// Start loading both bitmaps in the background
    pub fn preload(&mut self) {
        if matches!(self.top, FrameSlot::Unconfigured) {
            self.top = Self::spawn_load(self.top_path.clone());
        }
        if matches!(self.bottom, FrameSlot::Unconfigured) {
            self.bottom = Self::spawn_load(self.bottom_path.clone());
        }
    }

    fn spawn_load(path: Option<PathBuf>) -> FrameSlot {
        match path {
            None => FrameSlot::Ready(None),
            Some(path) => FrameSlot::Loading(tokio::task::spawn_blocking(move || {
                match image::open(&path) {
                    Ok(img) => {
                        debug!("Loaded frame bitmap {}", path.display());
                        Some(img.to_rgba8())
                    }
                    Err(e) => {
                        warn!("Frame bitmap {} skipped: {}", path.display(), e);
                        None
                    }
                }
            })),
        }
    }

    async fn resolve(slot: FrameSlot) -> FrameSlot {
        match slot {
            FrameSlot::Loading(handle) => match handle.await {
                Ok(img) => FrameSlot::Ready(img.map(Arc::new)),
                Err(e) => {
                    warn!("Frame bitmap load task failed: {}", e);
                    FrameSlot::Ready(None)
                }
            },
            other => other,
        }
    }

    /// Wait until both bitmaps are loaded or have failed
    pub async fn ensure_ready(&mut self) {
        self.preload();
        let top = std::mem::replace(&mut self.top, FrameSlot::Unconfigured);
        let bottom = std::mem::replace(&mut self.bottom, FrameSlot::Unconfigured);
        let (top, bottom) = tokio::join!(Self::resolve(top), Self::resolve(bottom));
        self.top = top;
        self.bottom = bottom;
    }

    pub fn top(&self) -> Option<&RgbaImage> {
        match &self.top {
            FrameSlot::Ready(Some(img)) => Some(img.as_ref()),
            _ => None,
        }
    }

    pub fn bottom(&self) -> Option<&RgbaImage> {
        match &self.bottom {
            FrameSlot::Ready(Some(img)) => Some(img.as_ref()),
            _ => None,
        }
    }

    /// Draw the loaded frames onto `raster`
    pub async fn apply_frames(&mut self, raster: &mut RgbaImage) {
        self.ensure_ready().await;

        if let Some(top) = self.top() {
            draw_frame(raster, top, FramePlacement::Top);
        }
        if let Some(bottom) = self.bottom() {
            draw_frame(raster, bottom, FramePlacement::Bottom);
        }

        info!(
            "Frames applied (top: {}, bottom: {})",
            self.top().is_some(),
            self.bottom().is_some()
        );
    }
}
