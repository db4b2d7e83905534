use super::booth::PhotoBooth;
use crate::dial::{ActionDialView, DialAction};
use crate::error::{PhotoboothError, Result};
use crate::events::PhotoboothEvent;
use crate::overlay::StickerId;
use crate::touch::TouchInput;
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

impl PhotoBooth {
    /// Place a sticker at the overlay center and select it
    pub fn add_sticker_image(&mut self, image: RgbaImage) -> Result<StickerId> {
        if !self.controls.stickers {
            return Err(PhotoboothError::component(
                "stickers",
                "sticker controls are disabled",
            ));
        }

        if self.gestures.is_dial_open() {
            let outcomes = self.gestures.dismiss(&mut self.scene);
            self.publish_outcomes(outcomes);
        }

        let id = self.scene.add_sticker(Arc::new(image));
        self.event_bus.publish(PhotoboothEvent::StickerAdded { id: id.0 });
        self.event_bus
            .publish(PhotoboothEvent::SelectionChanged { id: Some(id.0) });

        if self.sheet.is_open() {
            self.close_sheet();
        }
        Ok(id)
    }

    /// Load a sticker image from disk and place it
    pub async fn add_sticker<P: Into<PathBuf>>(&mut self, path: P) -> Result<StickerId> {
        let path = path.into();
        debug!("Loading sticker {}", path.display());
        let image = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| PhotoboothError::system(format!("sticker loader panicked: {}", e)))??;
        self.add_sticker_image(image.to_rgba8())
    }

    /// Place the `index`-th sticker of the active sheet tab
    pub async fn add_sticker_from_sheet(&mut self, index: usize) -> Result<StickerId> {
        let path = self
            .sheet
            .sticker_path(index)
            .map(str::to_string)
            .ok_or_else(|| {
                PhotoboothError::component("stickers", format!("no sticker at index {}", index))
            })?;
        self.add_sticker(path).await
    }

    pub fn handle_touch(&mut self, input: &TouchInput) {
        let outcomes = self
            .gestures
            .handle_touch(&mut self.scene, input, self.sheet.is_open());
        self.publish_outcomes(outcomes);
    }

    /// Apply any long-press timers that have already fired
    pub fn poll_timers(&mut self) {
        let outcomes = self.gestures.poll_timers(&mut self.scene);
        self.publish_outcomes(outcomes);
    }

    /// Wait for the pending long-press timer and apply it
    pub async fn wait_for_long_press(&mut self) {
        if let Some(timer) = self.gestures.next_timer().await {
            let outcomes = self.gestures.handle_timer(&mut self.scene, timer);
            self.publish_outcomes(outcomes);
        }
    }

    pub fn tap_dial_button(&mut self, action: DialAction) {
        let outcomes = self.gestures.tap_button(&mut self.scene, action);
        self.publish_outcomes(outcomes);
    }

    pub fn dismiss_dial(&mut self) {
        let outcomes = self.gestures.dismiss(&mut self.scene);
        self.publish_outcomes(outcomes);
    }

    pub fn dial_view(&self) -> ActionDialView {
        self.gestures.dial_view()
    }

    /// Open the sticker sheet; an open action dial is dismissed first
    pub fn open_sheet(&mut self) {
        if self.gestures.is_dial_open() {
            self.dismiss_dial();
        }
        if !self.sheet.is_open() {
            self.sheet.open();
            self.event_bus
                .publish(PhotoboothEvent::SheetToggled { open: true });
        }
    }

    pub fn close_sheet(&mut self) {
        if self.sheet.is_open() {
            self.sheet.close();
            self.event_bus
                .publish(PhotoboothEvent::SheetToggled { open: false });
        }
    }

    pub fn toggle_sheet(&mut self) -> bool {
        if self.sheet.is_open() {
            self.close_sheet();
        } else {
            self.open_sheet();
        }
        self.sheet.is_open()
    }

    pub fn activate_tab(&mut self, name: &str) -> Result<()> {
        if self.sheet.activate_tab(name) {
            info!("Sticker tab '{}' selected", name);
            Ok(())
        } else {
            Err(PhotoboothError::component(
                "stickers",
                format!("unknown sticker tab '{}'", name),
            ))
        }
    }
}
