use crate::config::DisplayConfig;
use crate::error::TouchError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use evdev::{AbsoluteAxisType, Device, EventStream, InputEvent, InputEventKind, Synchronization};

const MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Source of raw input events, normally an evdev event stream
#[async_trait]
pub(crate) trait RawEventSource: Send {
    async fn next_event(&mut self) -> std::io::Result<InputEvent>;
}

#[async_trait]
impl RawEventSource for EventStream {
    async fn next_event(&mut self) -> std::io::Result<InputEvent> {
        EventStream::next_event(self).await
    }
}

use super::tracker::{ContactEvent, MultitouchTracker};
use super::types::TouchInput;

/// Reads a Linux multitouch device and emits browser-style touch events
pub struct TouchInputHandler {
    pub(crate) device_path: String,
    raw_range: (i32, i32),
    surface: (f64, f64),
}

impl TouchInputHandler {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            device_path: config.touch_device.clone(),
            raw_range: config.touch_range,
            surface: (config.resolution.0 as f64, config.resolution.1 as f64),
        }
    }

    /// Map raw coordinates onto a different overlay size
    pub fn with_surface(mut self, surface: (f64, f64)) -> Self {
        self.surface = surface;
        self
    }

    fn open_device(&self) -> Result<Device, TouchError> {
        Device::open(&self.device_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TouchError::DeviceNotFound(self.device_path.clone()),
            std::io::ErrorKind::PermissionDenied => {
                TouchError::PermissionDenied(self.device_path.clone())
            }
            _ => TouchError::DeviceOpen {
                device: self.device_path.clone(),
                details: e.to_string(),
            },
        })
    }

    /// The device must report multitouch slots and positions
    pub(crate) fn validate_touch_device(device: &Device, device_path: &str) -> Result<(), TouchError> {
        let axes = device
            .supported_absolute_axes()
            .ok_or_else(|| TouchError::UnsupportedDevice(format!("{} has no absolute axes", device_path)))?;

        let multitouch = axes.contains(AbsoluteAxisType::ABS_MT_SLOT)
            && axes.contains(AbsoluteAxisType::ABS_MT_POSITION_X)
            && axes.contains(AbsoluteAxisType::ABS_MT_POSITION_Y);
        if !multitouch {
            return Err(TouchError::UnsupportedDevice(format!(
                "{} does not report multitouch slots",
                device_path
            )));
        }

        debug!("Device {} supports multitouch", device_path);
        Ok(())
    }

    pub(crate) fn map_event(event: &InputEvent) -> Option<ContactEvent> {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => match axis {
                AbsoluteAxisType::ABS_MT_SLOT => Some(ContactEvent::Slot(event.value())),
                AbsoluteAxisType::ABS_MT_TRACKING_ID => Some(ContactEvent::TrackingId(event.value())),
                AbsoluteAxisType::ABS_MT_POSITION_X => Some(ContactEvent::PositionX(event.value())),
                AbsoluteAxisType::ABS_MT_POSITION_Y => Some(ContactEvent::PositionY(event.value())),
                _ => None,
            },
            InputEventKind::Synchronization(Synchronization::SYN_REPORT) => Some(ContactEvent::Sync),
            _ => None,
        }
    }

    /// Open the device and forward touch events to `events` until cancelled
    pub fn start(
        &self,
        cancellation_token: CancellationToken,
        events: mpsc::UnboundedSender<TouchInput>,
    ) -> Result<JoinHandle<Result<(), TouchError>>, TouchError> {
        let device = self.open_device()?;
        Self::validate_touch_device(&device, &self.device_path)?;

        info!(
            "Touch device opened: {} ({})",
            self.device_path,
            device.name().unwrap_or("Unknown")
        );

        let stream = device.into_event_stream().map_err(|e| TouchError::DeviceOpen {
            device: self.device_path.clone(),
            details: e.to_string(),
        })?;

        let tracker = MultitouchTracker::new(self.raw_range, self.surface);
        Ok(tokio::spawn(forward_events(
            stream,
            tracker,
            cancellation_token,
            events,
            self.device_path.clone(),
        )))
    }
}

/// Track contacts from `source` and send the resulting touch events.
///
/// Stops as soon as `cancellation_token` fires, when the receiver is dropped,
/// or after repeated read errors. Contacts still down are cancelled on exit.
pub(crate) async fn forward_events<S: RawEventSource>(
    mut source: S,
    mut tracker: MultitouchTracker,
    cancellation_token: CancellationToken,
    events: mpsc::UnboundedSender<TouchInput>,
    device_path: String,
) -> Result<(), TouchError> {
    let mut consecutive_errors = 0;

    loop {
        let next = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            next = source.next_event() => next,
        };

        match next {
            Ok(event) => {
                consecutive_errors = 0;
                let Some(contact) = TouchInputHandler::map_event(&event) else {
                    continue;
                };
                for input in tracker.process(contact) {
                    if events.send(input).is_err() {
                        debug!("Touch receiver dropped, stopping reader");
                        return Ok(());
                    }
                }
            }
            Err(e) => {
                consecutive_errors += 1;
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    if let Some(cancel) = tracker.cancel_all() {
                        let _ = events.send(cancel);
                    }
                    return Err(TouchError::DeviceRead {
                        details: format!("{}: {}", device_path, e),
                    });
                }
                warn!(
                    "Error reading from touch device (attempt {}): {}",
                    consecutive_errors, e
                );
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }

    if let Some(cancel) = tracker.cancel_all() {
        let _ = events.send(cancel);
    }
    info!("Touch reader for {} stopped", device_path);
    Ok(())
}
