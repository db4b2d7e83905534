mod device;
#[cfg(all(feature = "camera", target_os = "linux"))]
mod gstreamer;
mod surface;
mod synthetic;
#[cfg(test)]
mod tests;

pub use device::{CameraDevice, FacingMode, StreamRequest, VideoStream};
#[cfg(all(feature = "camera", target_os = "linux"))]
pub use gstreamer::GstCameraDevice;
pub use surface::{crop_region, CaptureSurface, CropRegion, ViewMode};
pub use synthetic::SyntheticCamera;
