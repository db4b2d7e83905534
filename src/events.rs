use crate::camera::FacingMode;
use crate::error::EventBusError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// State changes the booth UI reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhotoboothEvent {
    /// Geofence decision; `message` is shown when access is refused
    AccessChecked { allowed: bool, message: Option<String> },
    /// Live stream running and controls enabled
    CameraStarted {
        facing: FacingMode,
        resolution: (u32, u32),
    },
    /// All tracks stopped
    CameraStopped,
    /// Camera start failed; controls stay disabled
    CameraFailed { message: String },
    StickerAdded { id: u64 },
    StickerRemoved { id: u64 },
    StickerReordered { id: u64, to_front: bool },
    StickerLockChanged { id: u64, locked: bool },
    SelectionChanged { id: Option<u64> },
    DialOpened { id: u64, x: f64, y: f64 },
    DialClosed,
    SheetToggled { open: bool },
    /// Composite raster ready for preview
    PhotoCaptured { width: u32, height: u32 },
    PhotoSaved { path: PathBuf },
    PhotoShared { file_name: String },
    /// Share unavailable or failed; the photo was saved instead
    ShareFallback { path: PathBuf, notice: String },
    PreviewClosed,
    SystemError { component: String, error: String },
    ShutdownRequested { reason: String },
}

impl PhotoboothEvent {
    pub fn description(&self) -> String {
        match self {
            PhotoboothEvent::AccessChecked { allowed, message } => match message {
                Some(message) if !allowed => format!("Access denied: {}", message),
                _ => format!("Access {}", if *allowed { "granted" } else { "denied" }),
            },
            PhotoboothEvent::CameraStarted { facing, resolution } => format!(
                "Camera started facing {} at {}x{}",
                facing, resolution.0, resolution.1
            ),
            PhotoboothEvent::CameraStopped => "Camera stopped".to_string(),
            PhotoboothEvent::CameraFailed { message } => format!("Camera failed: {}", message),
            PhotoboothEvent::StickerAdded { id } => format!("Sticker {} added", id),
            PhotoboothEvent::StickerRemoved { id } => format!("Sticker {} removed", id),
            PhotoboothEvent::StickerReordered { id, to_front } => format!(
                "Sticker {} moved to {}",
                id,
                if *to_front { "front" } else { "back" }
            ),
            PhotoboothEvent::StickerLockChanged { id, locked } => format!(
                "Sticker {} {}",
                id,
                if *locked { "locked" } else { "unlocked" }
            ),
            PhotoboothEvent::SelectionChanged { id } => match id {
                Some(id) => format!("Sticker {} selected", id),
                None => "Selection cleared".to_string(),
            },
            PhotoboothEvent::DialOpened { id, x, y } => {
                format!("Action dial opened for sticker {} at ({:.0}, {:.0})", id, x, y)
            }
            PhotoboothEvent::DialClosed => "Action dial closed".to_string(),
            PhotoboothEvent::SheetToggled { open } => {
                format!("Sticker sheet {}", if *open { "opened" } else { "closed" })
            }
            PhotoboothEvent::PhotoCaptured { width, height } => {
                format!("Photo captured ({}x{})", width, height)
            }
            PhotoboothEvent::PhotoSaved { path } => format!("Photo saved to {}", path.display()),
            PhotoboothEvent::PhotoShared { file_name } => format!("Photo shared as {}", file_name),
            PhotoboothEvent::ShareFallback { path, notice } => {
                format!("{} (saved to {})", notice, path.display())
            }
            PhotoboothEvent::PreviewClosed => "Preview closed".to_string(),
            PhotoboothEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
            PhotoboothEvent::ShutdownRequested { reason } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            PhotoboothEvent::AccessChecked { .. } => "access_checked",
            PhotoboothEvent::CameraStarted { .. } => "camera_started",
            PhotoboothEvent::CameraStopped => "camera_stopped",
            PhotoboothEvent::CameraFailed { .. } => "camera_failed",
            PhotoboothEvent::StickerAdded { .. } => "sticker_added",
            PhotoboothEvent::StickerRemoved { .. } => "sticker_removed",
            PhotoboothEvent::StickerReordered { .. } => "sticker_reordered",
            PhotoboothEvent::StickerLockChanged { .. } => "sticker_lock_changed",
            PhotoboothEvent::SelectionChanged { .. } => "selection_changed",
            PhotoboothEvent::DialOpened { .. } => "dial_opened",
            PhotoboothEvent::DialClosed => "dial_closed",
            PhotoboothEvent::SheetToggled { .. } => "sheet_toggled",
            PhotoboothEvent::PhotoCaptured { .. } => "photo_captured",
            PhotoboothEvent::PhotoSaved { .. } => "photo_saved",
            PhotoboothEvent::PhotoShared { .. } => "photo_shared",
            PhotoboothEvent::ShareFallback { .. } => "share_fallback",
            PhotoboothEvent::PreviewClosed => "preview_closed",
            PhotoboothEvent::SystemError { .. } => "system_error",
            PhotoboothEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Broadcast bus announcing booth state changes
pub struct EventBus {
    sender: broadcast::Sender<PhotoboothEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PhotoboothEvent> {
        self.sender.subscribe()
    }

    /// Publish to all subscribers. Returns the number of receivers reached;
    /// an event nobody listens to is not an error.
    pub fn publish(&self, event: PhotoboothEvent) -> usize {
        match &event {
            PhotoboothEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            PhotoboothEvent::CameraFailed { message } => {
                warn!("Camera failed: {}", message);
            }
            PhotoboothEvent::ShutdownRequested { reason } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => debug!("Event: {}", event.description()),
        }

        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    All,
    EventTypes(Vec<&'static str>),
    Custom(fn(&PhotoboothEvent) -> bool),
}

impl EventFilter {
    pub fn matches(&self, event: &PhotoboothEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::Custom(filter_fn) => filter_fn(event),
        }
    }
}

/// Named receiver that skips events its filter rejects
pub struct EventReceiver {
    receiver: broadcast::Receiver<PhotoboothEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    pub fn new(
        receiver: broadcast::Receiver<PhotoboothEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next event passing the filter
    pub async fn recv(&mut self) -> Result<PhotoboothEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged { skipped: n });
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<PhotoboothEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged { skipped: n });
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Drain everything currently queued that passes the filter
    pub fn drain(&mut self) -> Vec<PhotoboothEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }
}
