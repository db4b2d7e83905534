use super::booth::PhotoBooth;
use super::types::ModalMessage;
use crate::camera::ViewMode;
use crate::error::{CameraError, Result};
use crate::events::PhotoboothEvent;
use crate::preview::{PreviewSession, ShareOutcome};
use image::imageops::{self, FilterType};
use std::path::PathBuf;
use tracing::{info, warn};

impl PhotoBooth {
    /// Compose the current camera frame, frames and stickers into a photo.
    ///
    /// On success the camera is stopped and the preview opens. A failed
    /// frame grab leaves the live view running.
    pub async fn capture(&mut self) -> Result<&PreviewSession> {
        if !self.controls.shutter || !self.surface.is_streaming() {
            return Err(CameraError::NotStarted.into());
        }

        if self.gestures.is_dial_open() {
            self.dismiss_dial();
        }

        let mut raster = match self.surface.capture().await {
            Ok(raster) => raster,
            Err(e) => {
                warn!("Capture failed: {}", e);
                self.event_bus.publish(PhotoboothEvent::SystemError {
                    component: "camera".to_string(),
                    error: e.to_string(),
                });
                return Err(e.into());
            }
        };
        self.compositor.apply_frames(&mut raster).await;

        let had_selection = self.scene.selected().is_some();
        if !self.scene.is_empty() {
            let mut stickers = self.scene.flatten();
            if stickers.dimensions() != raster.dimensions() {
                stickers = imageops::resize(
                    &stickers,
                    raster.width(),
                    raster.height(),
                    FilterType::Triangle,
                );
            }
            imageops::overlay(&mut raster, &stickers, 0, 0);
        }
        if had_selection {
            self.event_bus
                .publish(PhotoboothEvent::SelectionChanged { id: None });
        }

        self.surface.stop();
        self.surface.set_view_mode(ViewMode::Frozen);
        self.event_bus.publish(PhotoboothEvent::CameraStopped);

        let (width, height) = raster.dimensions();
        info!("Captured {}x{} photo", width, height);
        self.event_bus
            .publish(PhotoboothEvent::PhotoCaptured { width, height });
        self.preview.show(raster).await
    }

    pub async fn save_photo(&mut self) -> Result<PathBuf> {
        let path = self.preview.save().await?;
        self.event_bus
            .publish(PhotoboothEvent::PhotoSaved { path: path.clone() });
        Ok(path)
    }

    /// Share the photo, saving it instead when sharing is unavailable
    pub async fn share_photo(&mut self) -> Result<ShareOutcome> {
        let outcome = self.preview.share().await?;
        match &outcome {
            ShareOutcome::Shared { file_name } => {
                self.event_bus.publish(PhotoboothEvent::PhotoShared {
                    file_name: file_name.clone(),
                });
            }
            ShareOutcome::SavedInstead { path, notice } => {
                warn!("Share fell back to save: {}", notice);
                self.modal = Some(ModalMessage::Notice(notice.clone()));
                self.event_bus.publish(PhotoboothEvent::ShareFallback {
                    path: path.clone(),
                    notice: notice.clone(),
                });
            }
        }
        Ok(outcome)
    }

    /// Release the preview and return to the live camera
    pub async fn close_preview(&mut self) -> bool {
        if self.preview.close() {
            self.event_bus.publish(PhotoboothEvent::PreviewClosed);
        }
        self.start_camera().await
    }
}
