/// Which booth controls accept input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub shutter: bool,
    pub stickers: bool,
    pub camera_toggle: bool,
}

impl ControlState {
    pub fn disabled() -> Self {
        Self {
            shutter: false,
            stickers: false,
            camera_toggle: false,
        }
    }

    pub fn enabled() -> Self {
        Self {
            shutter: true,
            stickers: true,
            camera_toggle: true,
        }
    }

    pub fn all_enabled(&self) -> bool {
        self.shutter && self.stickers && self.camera_toggle
    }
}

/// Modal dialog content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMessage {
    /// Shown once the booth is ready; dismissible
    Welcome,
    /// A failure that ends the session; cannot be dismissed
    Blocking(String),
    /// Informational, e.g. a share fallback; dismissible
    Notice(String),
}

impl ModalMessage {
    pub fn is_dismissible(&self) -> bool {
        !matches!(self, ModalMessage::Blocking(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ModalMessage::Welcome => None,
            ModalMessage::Blocking(text) | ModalMessage::Notice(text) => Some(text),
        }
    }
}

/// Why the booth is shutting down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    Signal(String),
    Error(String),
    UserRequest,
}

impl std::fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownReason::Signal(signal) => write!(f, "signal {}", signal),
            ShutdownReason::Error(error) => write!(f, "error: {}", error),
            ShutdownReason::UserRequest => f.write_str("user request"),
        }
    }
}
