use super::booth::PhotoBooth;
use super::types::{ControlState, ModalMessage};
use crate::camera::{FacingMode, ViewMode};
use crate::error::UserMessage;
use crate::events::PhotoboothEvent;
use tracing::{info, warn};

impl PhotoBooth {
    /// Run the access check and start the camera.
    ///
    /// Returns true when the booth is ready for use. A denied check leaves a
    /// blocking modal up and never touches the camera.
    pub async fn initialize(&mut self) -> bool {
        info!("Initializing photo booth");
        self.controls = ControlState::disabled();
        self.compositor.preload();

        if self.gate.is_enabled() {
            let decision = self.gate.check_access().await;
            let message = decision.message();
            self.event_bus.publish(PhotoboothEvent::AccessChecked {
                allowed: decision.allowed,
                message: message.clone(),
            });

            if !decision.allowed {
                let text = message.unwrap_or_default();
                warn!("Access refused: {}", text);
                self.modal = Some(ModalMessage::Blocking(text));
                return false;
            }
        }

        let started = self.start_camera().await;
        if started {
            self.modal = Some(ModalMessage::Welcome);
            info!("Photo booth ready");
        }
        started
    }

    /// (Re)open the camera with the current facing mode
    pub async fn start_camera(&mut self) -> bool {
        let facing = self.surface.facing();
        self.open_camera(facing).await
    }

    /// Switch between the front and rear camera
    pub async fn toggle_facing(&mut self) -> bool {
        let facing = self.surface.facing().toggled();
        info!("Switching camera to {}", facing);
        self.open_camera(facing).await
    }

    pub fn facing(&self) -> FacingMode {
        self.surface.facing()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.surface.view_mode()
    }

    /// Resize the capture surface and overlay to a new layout
    pub fn resize(&mut self, css_width: f64, css_height: f64, device_pixel_ratio: f64) {
        let width = css_width.round().max(1.0) as u32;
        let height = css_height.round().max(1.0) as u32;
        self.surface.resize(width, height);
        self.scene.resize(css_width, css_height, device_pixel_ratio);
    }

    async fn open_camera(&mut self, facing: FacingMode) -> bool {
        match self.surface.start(facing).await {
            Ok(resolution) => {
                self.surface.set_view_mode(ViewMode::Live);
                self.controls = ControlState::enabled();
                self.event_bus
                    .publish(PhotoboothEvent::CameraStarted { facing, resolution });
                true
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Camera start failed: {}", e);
                self.controls = ControlState::disabled();
                self.modal = Some(ModalMessage::Blocking(message.clone()));
                self.event_bus
                    .publish(PhotoboothEvent::CameraFailed { message });
                false
            }
        }
    }
}
