use super::share::{ShareFile, ShareTarget};
use crate::config::ExportConfig;
use crate::error::{PhotoboothError, Result};
use chrono::{DateTime, Utc};
use image::{ImageOutputFormat, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SHARE_UNSUPPORTED_NOTICE: &str =
    "Sharing is not supported here, so the photo was saved. Use your device's share feature to send it.";
const SHARE_FAILED_NOTICE: &str =
    "Sharing failed, so the photo was saved. Use your device's share feature to send it.";

/// An encoded photo under review
#[derive(Debug, Clone)]
pub struct PreviewSession {
    pub id: u64,
    pub png: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
}

/// Result of a share request
#[derive(Debug, Clone, PartialEq)]
pub enum ShareOutcome {
    Shared { file_name: String },
    /// Sharing was unavailable or failed; the photo was saved instead
    SavedInstead { path: PathBuf, notice: String },
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    Ok(png)
}

/// File name for a locally saved photo, e.g. `photo_1700000000000.png`
pub fn save_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.png", prefix, at.timestamp_millis())
}

/// Preview modal with save, share and close
pub struct PreviewFlow {
    config: ExportConfig,
    share_target: Arc<dyn ShareTarget>,
    current: Option<PreviewSession>,
    next_id: u64,
}

impl PreviewFlow {
    pub fn new(config: ExportConfig, share_target: Arc<dyn ShareTarget>) -> Self {
        Self {
            config,
            share_target,
            current: None,
            next_id: 1,
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&PreviewSession> {
        self.current.as_ref()
    }

    fn release(&mut self) {
        if let Some(previous) = self.current.take() {
            debug!("Released preview {}", previous.id);
        }
    }

    /// Encode `image` and show it, releasing any earlier preview
    pub async fn show(&mut self, image: RgbaImage) -> Result<&PreviewSession> {
        self.release();

        let (width, height) = image.dimensions();
        let png = tokio::task::spawn_blocking(move || encode_png(&image))
            .await
            .map_err(|e| PhotoboothError::component("preview", format!("PNG encoding task failed: {}", e)))??;

        let id = self.next_id;
        self.next_id += 1;
        info!("Preview {} ready ({}x{}, {} bytes)", id, width, height, png.len());

        Ok(self.current.insert(PreviewSession {
            id,
            png: Arc::new(png),
            width,
            height,
            created_at: Utc::now(),
        }))
    }

    fn session(&self) -> Result<&PreviewSession> {
        self.current
            .as_ref()
            .ok_or_else(|| PhotoboothError::component("preview", "no photo to export"))
    }

    /// Write the PNG to the output directory under a timestamped name
    pub async fn save(&self) -> Result<PathBuf> {
        let session = self.session()?;
        let dir = PathBuf::from(&self.config.output_dir);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(save_file_name(&self.config.filename_prefix, Utc::now()));
        tokio::fs::write(&path, session.png.as_slice()).await?;

        info!("Photo saved to {}", path.display());
        Ok(path)
    }

    /// Share as `photo.png`, saving locally with a notice if that is not possible
    pub async fn share(&self) -> Result<ShareOutcome> {
        let session = self.session()?;
        let file = ShareFile::png(Arc::clone(&session.png));

        let notice = if !self.share_target.can_share(&file) {
            SHARE_UNSUPPORTED_NOTICE
        } else {
            match self.share_target.share(&file).await {
                Ok(()) => {
                    return Ok(ShareOutcome::Shared {
                        file_name: file.name,
                    })
                }
                Err(e) => {
                    warn!("Share failed: {}", e);
                    SHARE_FAILED_NOTICE
                }
            }
        };

        let path = self.save().await?;
        Ok(ShareOutcome::SavedInstead {
            path,
            notice: notice.to_string(),
        })
    }

    /// Dismiss the preview. Returns false if none was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.release();
        was_open
    }
}
