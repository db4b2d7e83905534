pub mod app;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod dial;
pub mod error;
pub mod events;
pub mod geofence;
pub mod geometry;
pub mod overlay;
pub mod preview;
pub mod touch;

pub use app::{ControlState, ModalMessage, PhotoBooth, PhotoBoothBuilder, ShutdownReason, StickerSheet};
pub use camera::{CameraDevice, CaptureSurface, FacingMode, SyntheticCamera, ViewMode};
pub use compositor::FrameCompositor;
pub use config::PhotoboothConfig;
pub use dial::{ActionDialView, DialAction, GestureController};
pub use error::{PhotoboothError, Result};
pub use events::{EventBus, EventFilter, EventReceiver, PhotoboothEvent};
pub use geofence::{AccessDecision, GeoFenceGate, LocationProvider};
pub use geometry::Point;
pub use overlay::{InteractionMode, Scene, StickerId, StickerObject};
pub use preview::{PreviewFlow, ShareOutcome, ShareTarget};
pub use touch::{TouchInput, TouchPhase, TouchPoint};
