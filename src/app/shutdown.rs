use super::booth::PhotoBooth;
use super::types::{ControlState, ShutdownReason};
use crate::events::PhotoboothEvent;
use tracing::info;

impl PhotoBooth {
    /// Stop the camera and release everything the session holds
    pub fn shutdown(&mut self, reason: ShutdownReason) {
        info!("Shutting down photo booth: {}", reason);
        self.event_bus.publish(PhotoboothEvent::ShutdownRequested {
            reason: reason.to_string(),
        });

        if self.gestures.is_dial_open() {
            self.dismiss_dial();
        }

        self.controls = ControlState::disabled();
        if self.surface.is_streaming() {
            self.surface.stop();
            self.event_bus.publish(PhotoboothEvent::CameraStopped);
        }

        if self.preview.close() {
            self.event_bus.publish(PhotoboothEvent::PreviewClosed);
        }
        info!("Photo booth shutdown complete");
    }
}
