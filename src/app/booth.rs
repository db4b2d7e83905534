use super::sheet::StickerSheet;
use super::types::{ControlState, ModalMessage};
use crate::camera::{CameraDevice, CaptureSurface};
use crate::compositor::FrameCompositor;
use crate::config::PhotoboothConfig;
use crate::dial::{GestureController, GestureOutcome};
use crate::error::{PhotoboothError, Result};
use crate::events::{EventBus, PhotoboothEvent};
use crate::geofence::{FixedLocation, GeoFenceGate, LocationProvider, NoLocation};
use crate::overlay::Scene;
use crate::preview::{CommandShare, PreviewFlow, ShareTarget, UnsupportedShare};
use std::sync::Arc;

/// Application state of the photo booth, owned by one controller
pub struct PhotoBooth {
    pub(super) config: PhotoboothConfig,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) gate: GeoFenceGate,
    pub(super) surface: CaptureSurface,
    pub(super) compositor: FrameCompositor,
    pub(super) scene: Scene,
    pub(super) gestures: GestureController,
    pub(super) preview: PreviewFlow,
    pub(super) sheet: StickerSheet,
    pub(super) controls: ControlState,
    pub(super) modal: Option<ModalMessage>,
}

impl PhotoBooth {
    pub fn builder() -> PhotoBoothBuilder {
        PhotoBoothBuilder::default()
    }

    pub fn config(&self) -> &PhotoboothConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn controls(&self) -> ControlState {
        self.controls
    }

    pub fn modal(&self) -> Option<&ModalMessage> {
        self.modal.as_ref()
    }

    /// Close the modal if it allows it
    pub fn dismiss_modal(&mut self) -> bool {
        match &self.modal {
            Some(modal) if modal.is_dismissible() => {
                self.modal = None;
                true
            }
            _ => false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn surface(&self) -> &CaptureSurface {
        &self.surface
    }

    pub fn sheet(&self) -> &StickerSheet {
        &self.sheet
    }

    pub fn preview(&self) -> &PreviewFlow {
        &self.preview
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub(super) fn publish_outcomes(&self, outcomes: Vec<GestureOutcome>) {
        for outcome in outcomes {
            let event = match outcome {
                GestureOutcome::Selected(id) => PhotoboothEvent::SelectionChanged { id: Some(id.0) },
                GestureOutcome::Deselected => PhotoboothEvent::SelectionChanged { id: None },
                GestureOutcome::DialOpened { target, at } => PhotoboothEvent::DialOpened {
                    id: target.0,
                    x: at.x,
                    y: at.y,
                },
                GestureOutcome::DialClosed => PhotoboothEvent::DialClosed,
                GestureOutcome::Removed(id) => PhotoboothEvent::StickerRemoved { id: id.0 },
                GestureOutcome::LockChanged { target, locked } => PhotoboothEvent::StickerLockChanged {
                    id: target.0,
                    locked,
                },
                GestureOutcome::Reordered { target, action } => PhotoboothEvent::StickerReordered {
                    id: target.0,
                    to_front: action == crate::dial::DialAction::BringToFront,
                },
            };
            self.event_bus.publish(event);
        }
    }
}

/// Assembles a `PhotoBooth` from configuration and platform collaborators
#[derive(Default)]
pub struct PhotoBoothBuilder {
    config: Option<PhotoboothConfig>,
    camera: Option<Arc<dyn CameraDevice>>,
    location: Option<Arc<dyn LocationProvider>>,
    share_target: Option<Arc<dyn ShareTarget>>,
    event_bus: Option<Arc<EventBus>>,
}

impl PhotoBoothBuilder {
    pub fn with_config(mut self, config: PhotoboothConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_camera(mut self, camera: Arc<dyn CameraDevice>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_location(mut self, location: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_share_target(mut self, share_target: Arc<dyn ShareTarget>) -> Self {
        self.share_target = Some(share_target);
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<PhotoBooth> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let camera = self
            .camera
            .ok_or_else(|| PhotoboothError::component("photobooth", "no camera device configured"))?;

        let location: Arc<dyn LocationProvider> = match (self.location, config.geofence.device_position) {
            (Some(location), _) => location,
            (None, Some((latitude, longitude))) => Arc::new(FixedLocation::new(latitude, longitude)),
            (None, None) => Arc::new(NoLocation),
        };

        let share_target: Arc<dyn ShareTarget> = match (self.share_target, &config.export.share_command) {
            (Some(target), _) => target,
            (None, Some(command)) => Arc::new(CommandShare::new(
                command.clone(),
                config.export.share_args.clone(),
            )),
            (None, None) => Arc::new(UnsupportedShare),
        };

        let event_bus = self.event_bus.unwrap_or_default();
        let (width, height) = config.display.resolution;

        Ok(PhotoBooth {
            gate: GeoFenceGate::new(config.geofence.clone(), location),
            surface: CaptureSurface::new(config.camera.clone(), camera, (width, height)),
            compositor: FrameCompositor::new(&config.frames),
            scene: Scene::new(
                config.overlay.clone(),
                (width as f64, height as f64),
                config.display.device_pixel_ratio,
            ),
            gestures: GestureController::new(&config.dial),
            preview: PreviewFlow::new(config.export.clone(), share_target),
            sheet: StickerSheet::new(config.stickers.tabs.clone()),
            controls: ControlState::disabled(),
            modal: None,
            event_bus,
            config,
        })
    }
}
