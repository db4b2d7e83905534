use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoboothError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Share error: {0}")]
    Share(#[from] ShareError),

    #[error("Touch error: {0}")]
    Touch(#[from] TouchError),

    #[error("Sticker {id} not found")]
    StickerNotFound { id: u64 },

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl PhotoboothError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<C: Into<String>, M: Into<String>>(component: C, message: M) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Camera acquisition and frame capture failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Camera access denied")]
    PermissionDenied,

    #[error("Camera device not found: {device}")]
    NotFound { device: String },

    #[error("Camera stream is not running")]
    NotStarted,

    #[error("No decodable frame after {attempts} attempts")]
    FrameTimeout { attempts: u32 },

    #[error("Camera stream error: {details}")]
    Stream { details: String },

    #[error("Camera configuration error: {details}")]
    Configuration { details: String },
}

/// Device position failures reported by a location provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location services not supported")]
    Unsupported,

    #[error("Position unavailable")]
    PositionUnavailable,

    #[error("Location fix timed out")]
    Timeout,

    #[error("Unknown location error: {details}")]
    Unknown { details: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShareError {
    #[error("Sharing is not supported")]
    Unsupported,

    #[error("Share failed: {details}")]
    Failed { details: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TouchError {
    #[error("Failed to open touch device {device}: {details}")]
    DeviceOpen { device: String, details: String },

    #[error("Touch device read error: {details}")]
    DeviceRead { details: String },

    #[error("Touch device not found: {0}")]
    DeviceNotFound(String),

    #[error("Permission denied for touch device: {0}")]
    PermissionDenied(String),

    #[error("Unsupported touch device: {0}")]
    UnsupportedDevice(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventBusError {
    #[error("Receiver lagged behind by {skipped} events")]
    Lagged { skipped: u64 },

    #[error("Event bus closed")]
    ChannelClosed,
}

/// Text shown to the user in a blocking modal when an attempt fails
pub trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for CameraError {
    fn user_message(&self) -> String {
        match self {
            CameraError::PermissionDenied => {
                "Camera access was denied. Please allow it in your settings.".to_string()
            }
            CameraError::NotFound { .. } => "No camera was found.".to_string(),
            _ => "An error occurred while accessing the camera.".to_string(),
        }
    }
}

impl UserMessage for LocationError {
    fn user_message(&self) -> String {
        match self {
            LocationError::PermissionDenied => {
                "Location access was denied. Please allow it in your settings.".to_string()
            }
            LocationError::Unsupported => {
                "This device does not support location services.".to_string()
            }
            LocationError::PositionUnavailable => "Your location could not be determined.".to_string(),
            LocationError::Timeout => "Timed out while determining your location.".to_string(),
            LocationError::Unknown { .. } => {
                "An unknown error occurred while accessing your location.".to_string()
            }
        }
    }
}

impl UserMessage for TouchError {
    fn user_message(&self) -> String {
        match self {
            TouchError::DeviceOpen { device, .. } => format!("Touch device not found at {}", device),
            TouchError::DeviceRead { details } => format!("Touch device read error: {}", details),
            TouchError::DeviceNotFound(device) => format!("Touch device not found: {}", device),
            TouchError::PermissionDenied(device) => {
                format!("Permission denied for touch device: {}", device)
            }
            TouchError::UnsupportedDevice(device) => format!("Unsupported touch device: {}", device),
        }
    }
}

pub type Result<T> = std::result::Result<T, PhotoboothError>;
