use crate::camera::FacingMode;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PhotoboothConfig {
    pub geofence: GeofenceConfig,
    pub camera: CameraConfig,
    pub display: DisplayConfig,
    #[serde(default)]
    pub frames: FramesConfig,
    pub overlay: OverlayConfig,
    pub dial: DialConfig,
    pub export: ExportConfig,
    #[serde(default)]
    pub stickers: StickerSheetConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeofenceConfig {
    /// Gate app usage on the device being inside the allowed area
    #[serde(default = "default_geofence_enabled")]
    pub enabled: bool,

    /// Latitude of the allowed area center
    #[serde(default = "default_geofence_latitude")]
    pub latitude: f64,

    /// Longitude of the allowed area center
    #[serde(default = "default_geofence_longitude")]
    pub longitude: f64,

    /// Radius of the allowed area in meters
    #[serde(default = "default_geofence_radius")]
    pub radius_meters: f64,

    /// Upper bound on a single location fix
    #[serde(default = "default_geofence_timeout")]
    pub timeout_seconds: u64,

    /// Fixed device position (latitude, longitude) for kiosks without a receiver
    pub device_position: Option<(f64, f64)>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Lens selected at startup
    #[serde(default = "default_facing_mode")]
    pub facing_mode: FacingMode,

    /// Device index of the outward-facing camera (e.g., 0 for /dev/video0)
    #[serde(default = "default_environment_device")]
    pub environment_device: u32,

    /// Device index of the inward-facing camera
    #[serde(default = "default_user_device")]
    pub user_device: u32,

    /// Resolution hint sent with the stream request (width, height)
    #[serde(default = "default_ideal_resolution")]
    pub ideal_resolution: (u32, u32),

    /// Delay between polls while waiting for the first decodable frame
    #[serde(default = "default_frame_retry_delay")]
    pub frame_retry_delay_ms: u64,

    /// Number of polls before a capture gives up
    #[serde(default = "default_frame_retry_limit")]
    pub frame_retry_limit: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Displayed size of the camera feed in CSS pixels (width, height)
    #[serde(default = "default_display_resolution")]
    pub resolution: (u32, u32),

    /// Physical pixels per CSS pixel
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,

    /// Touch input device path
    #[serde(default = "default_touch_device")]
    pub touch_device: String,

    /// Maximum raw multitouch coordinates reported by the touch device (x, y)
    #[serde(default = "default_touch_range")]
    pub touch_range: (i32, i32),
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FramesConfig {
    /// Decorative bitmap drawn flush to the top edge
    pub top: Option<String>,

    /// Decorative bitmap drawn flush to the bottom edge
    pub bottom: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OverlayConfig {
    /// Default sticker size as a fraction of the shorter overlay side
    #[serde(default = "default_size_fraction")]
    pub default_size_fraction: f64,

    #[serde(default = "default_min_scale")]
    pub min_scale: f64,

    #[serde(default = "default_max_scale")]
    pub max_scale: f64,

    /// Extra margin around sticker bounds accepted by hit-testing, in CSS pixels
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,

    /// Opacity applied to locked stickers
    #[serde(default = "default_locked_opacity")]
    pub locked_opacity: f64,

    /// Diameter of the selection corner handles in CSS pixels
    #[serde(default = "default_corner_size")]
    pub corner_size: f64,

    /// Selection border and handle color (r, g, b)
    #[serde(default = "default_accent_color")]
    pub accent_color: (u8, u8, u8),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DialConfig {
    /// Hold duration before the action dial opens
    #[serde(default = "default_long_press")]
    pub long_press_ms: u64,

    /// Movement that turns a press into a drag, in CSS pixels
    #[serde(default = "default_jitter_threshold")]
    pub jitter_threshold: f64,

    /// Minimum release distance for a flick, in CSS pixels
    #[serde(default = "default_flick_threshold")]
    pub flick_threshold: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportConfig {
    /// Directory receiving saved photos
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Saved files are named `<prefix>_<epoch-millis>.png`
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,

    /// External program invoked with the shared file path appended
    pub share_command: Option<String>,

    #[serde(default)]
    pub share_args: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StickerSheetConfig {
    #[serde(default)]
    pub tabs: Vec<StickerTab>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StickerTab {
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl PhotoboothConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("photobooth.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("geofence.enabled", default_geofence_enabled())?
            .set_default("geofence.latitude", default_geofence_latitude())?
            .set_default("geofence.longitude", default_geofence_longitude())?
            .set_default("geofence.radius_meters", default_geofence_radius())?
            .set_default("geofence.timeout_seconds", default_geofence_timeout())?
            .set_default("camera.facing_mode", default_facing_mode().as_str())?
            .set_default("camera.environment_device", default_environment_device())?
            .set_default("camera.user_device", default_user_device())?
            .set_default(
                "camera.ideal_resolution",
                vec![default_ideal_resolution().0, default_ideal_resolution().1],
            )?
            .set_default("camera.frame_retry_delay_ms", default_frame_retry_delay())?
            .set_default("camera.frame_retry_limit", default_frame_retry_limit())?
            .set_default(
                "display.resolution",
                vec![
                    default_display_resolution().0,
                    default_display_resolution().1,
                ],
            )?
            .set_default("display.device_pixel_ratio", default_device_pixel_ratio())?
            .set_default("display.touch_device", default_touch_device())?
            .set_default(
                "display.touch_range",
                vec![default_touch_range().0, default_touch_range().1],
            )?
            .set_default("overlay.default_size_fraction", default_size_fraction())?
            .set_default("overlay.min_scale", default_min_scale())?
            .set_default("overlay.max_scale", default_max_scale())?
            .set_default("overlay.hit_tolerance", default_hit_tolerance())?
            .set_default("overlay.locked_opacity", default_locked_opacity())?
            .set_default("overlay.corner_size", default_corner_size())?
            .set_default(
                "overlay.accent_color",
                vec![
                    default_accent_color().0 as u32,
                    default_accent_color().1 as u32,
                    default_accent_color().2 as u32,
                ],
            )?
            .set_default("dial.long_press_ms", default_long_press())?
            .set_default("dial.jitter_threshold", default_jitter_threshold())?
            .set_default("dial.flick_threshold", default_flick_threshold())?
            .set_default("export.output_dir", default_output_dir())?
            .set_default("export.filename_prefix", default_filename_prefix())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables, e.g. PHOTOBOOTH_GEOFENCE__ENABLED=true
            .add_source(
                Environment::with_prefix("PHOTOBOOTH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: PhotoboothConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geofence.enabled && self.geofence.radius_meters <= 0.0 {
            return Err(ConfigError::Message(
                "Geofence radius_meters must be greater than 0".to_string(),
            ));
        }

        if self.geofence.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Geofence timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.camera.ideal_resolution.0 == 0 || self.camera.ideal_resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera ideal_resolution must be greater than 0".to_string(),
            ));
        }

        if self.camera.frame_retry_limit == 0 {
            return Err(ConfigError::Message(
                "Camera frame_retry_limit must be greater than 0".to_string(),
            ));
        }

        if self.display.resolution.0 == 0 || self.display.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Display resolution must be greater than 0".to_string(),
            ));
        }

        if self.display.device_pixel_ratio <= 0.0 {
            return Err(ConfigError::Message(
                "Display device_pixel_ratio must be greater than 0".to_string(),
            ));
        }

        if self.overlay.min_scale <= 0.0 || self.overlay.min_scale > self.overlay.max_scale {
            return Err(ConfigError::Message(
                "Overlay scale bounds must satisfy 0 < min_scale <= max_scale".to_string(),
            ));
        }

        if self.overlay.default_size_fraction <= 0.0 || self.overlay.default_size_fraction > 1.0 {
            return Err(ConfigError::Message(
                "Overlay default_size_fraction must be within (0, 1]".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.overlay.locked_opacity) {
            return Err(ConfigError::Message(
                "Overlay locked_opacity must be within [0, 1]".to_string(),
            ));
        }

        if self.dial.long_press_ms == 0 {
            return Err(ConfigError::Message(
                "Dial long_press_ms must be greater than 0".to_string(),
            ));
        }

        if self.dial.jitter_threshold <= 0.0 || self.dial.flick_threshold <= 0.0 {
            return Err(ConfigError::Message(
                "Dial thresholds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PhotoboothConfig {
    fn default() -> Self {
        Self {
            geofence: GeofenceConfig {
                enabled: default_geofence_enabled(),
                latitude: default_geofence_latitude(),
                longitude: default_geofence_longitude(),
                radius_meters: default_geofence_radius(),
                timeout_seconds: default_geofence_timeout(),
                device_position: None,
            },
            camera: CameraConfig {
                facing_mode: default_facing_mode(),
                environment_device: default_environment_device(),
                user_device: default_user_device(),
                ideal_resolution: default_ideal_resolution(),
                frame_retry_delay_ms: default_frame_retry_delay(),
                frame_retry_limit: default_frame_retry_limit(),
            },
            display: DisplayConfig {
                resolution: default_display_resolution(),
                device_pixel_ratio: default_device_pixel_ratio(),
                touch_device: default_touch_device(),
                touch_range: default_touch_range(),
            },
            frames: FramesConfig::default(),
            overlay: OverlayConfig::default(),
            dial: DialConfig::default(),
            export: ExportConfig {
                output_dir: default_output_dir(),
                filename_prefix: default_filename_prefix(),
                share_command: None,
                share_args: Vec::new(),
            },
            stickers: StickerSheetConfig::default(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            default_size_fraction: default_size_fraction(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            hit_tolerance: default_hit_tolerance(),
            locked_opacity: default_locked_opacity(),
            corner_size: default_corner_size(),
            accent_color: default_accent_color(),
        }
    }
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            long_press_ms: default_long_press(),
            jitter_threshold: default_jitter_threshold(),
            flick_threshold: default_flick_threshold(),
        }
    }
}

// Default value functions
fn default_geofence_enabled() -> bool {
    false
}
fn default_geofence_latitude() -> f64 {
    35.572474208473515
}
fn default_geofence_longitude() -> f64 {
    139.74800306377824
}
fn default_geofence_radius() -> f64 {
    100.0
}
fn default_geofence_timeout() -> u64 {
    10
}

fn default_facing_mode() -> FacingMode {
    FacingMode::Environment
}
fn default_environment_device() -> u32 {
    0
}
fn default_user_device() -> u32 {
    1
}
fn default_ideal_resolution() -> (u32, u32) {
    (4096, 4096)
}
fn default_frame_retry_delay() -> u64 {
    50
}
fn default_frame_retry_limit() -> u32 {
    100
} // 5 seconds at the default delay

fn default_display_resolution() -> (u32, u32) {
    (480, 640)
}
fn default_device_pixel_ratio() -> f64 {
    1.0
}
fn default_touch_device() -> String {
    "/dev/input/event0".to_string()
}
fn default_touch_range() -> (i32, i32) {
    (4095, 4095)
}

fn default_size_fraction() -> f64 {
    0.3
}
fn default_min_scale() -> f64 {
    0.1
}
fn default_max_scale() -> f64 {
    5.0
}
fn default_hit_tolerance() -> f64 {
    12.0
}
fn default_locked_opacity() -> f64 {
    0.95
}
fn default_corner_size() -> f64 {
    26.0
}
fn default_accent_color() -> (u8, u8, u8) {
    (0xff, 0x5b, 0x82)
}

fn default_long_press() -> u64 {
    450
}
fn default_jitter_threshold() -> f64 {
    10.0
}
fn default_flick_threshold() -> f64 {
    50.0
}

fn default_output_dir() -> String {
    "./photos".to_string()
}
fn default_filename_prefix() -> String {
    "photo".to_string()
}
