#[cfg(all(feature = "touchscreen", target_os = "linux"))]
mod handler;
mod tracker;
mod types;
#[cfg(all(feature = "touchscreen", target_os = "linux"))]
mod utils;
#[cfg(test)]
mod tests;

#[cfg(all(feature = "touchscreen", target_os = "linux"))]
pub use handler::TouchInputHandler;
pub use tracker::{ContactEvent, MultitouchTracker};
pub use types::{TouchInput, TouchPhase, TouchPoint};
#[cfg(all(feature = "touchscreen", target_os = "linux"))]
pub use utils::{TouchDeviceInfo, TouchDeviceUtils};
