use crate::error::TouchError;
use evdev::{AbsoluteAxisType, Device};
use tracing::info;

/// Multitouch device discovery
pub struct TouchDeviceUtils;

impl TouchDeviceUtils {
    /// Event devices that report multitouch positions
    pub fn discover_touch_devices() -> Vec<String> {
        let mut devices = Vec::new();

        for i in 0..16 {
            let device_path = format!("/dev/input/event{}", i);
            if let Ok(info) = Self::get_device_info(&device_path) {
                if info.is_suitable_for_touch() {
                    info!("Found multitouch device: {}", info.description());
                    devices.push(device_path);
                }
            }
        }

        devices
    }

    pub fn get_device_info(device_path: &str) -> Result<TouchDeviceInfo, TouchError> {
        let device = Device::open(device_path).map_err(|e| TouchError::DeviceOpen {
            device: device_path.to_string(),
            details: e.to_string(),
        })?;

        let axes = device.supported_absolute_axes();
        let has = |axis: AbsoluteAxisType| axes.map(|a| a.contains(axis)).unwrap_or(false);

        Ok(TouchDeviceInfo {
            path: device_path.to_string(),
            name: device.name().unwrap_or("Unknown").to_string(),
            vendor_id: device.input_id().vendor(),
            product_id: device.input_id().product(),
            supports_slots: has(AbsoluteAxisType::ABS_MT_SLOT),
            supports_positions: has(AbsoluteAxisType::ABS_MT_POSITION_X)
                && has(AbsoluteAxisType::ABS_MT_POSITION_Y),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TouchDeviceInfo {
    pub path: String,
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub supports_slots: bool,
    pub supports_positions: bool,
}

impl TouchDeviceInfo {
    pub fn is_suitable_for_touch(&self) -> bool {
        self.supports_slots && self.supports_positions
    }

    pub fn description(&self) -> String {
        format!(
            "{} ({}) - slots: {}, positions: {}",
            self.name, self.path, self.supports_slots, self.supports_positions
        )
    }
}
