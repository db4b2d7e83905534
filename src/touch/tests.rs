use super::*;

fn create_tracker() -> MultitouchTracker {
    // raw 0..1000 onto a 200x100 overlay
    MultitouchTracker::new((1000, 1000), (200.0, 100.0))
}

fn press(tracker: &mut MultitouchTracker, slot: i32, id: i32, x: i32, y: i32) -> Vec<TouchInput> {
    tracker.process(ContactEvent::Slot(slot));
    tracker.process(ContactEvent::TrackingId(id));
    tracker.process(ContactEvent::PositionX(x));
    tracker.process(ContactEvent::PositionY(y));
    tracker.process(ContactEvent::Sync)
}

#[test]
fn test_single_finger_start_scales_coordinates() {
    let mut tracker = create_tracker();
    let inputs = press(&mut tracker, 0, 7, 500, 250);

    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].phase, TouchPhase::Start);
    assert_eq!(inputs[0].touches, vec![TouchPoint::new(7, 100.0, 25.0)]);
    assert_eq!(inputs[0].changed, inputs[0].touches);
    assert_eq!(tracker.active_count(), 1);
}

#[test]
fn test_move_and_release() {
    let mut tracker = create_tracker();
    press(&mut tracker, 0, 1, 100, 100);

    tracker.process(ContactEvent::PositionX(200));
    let moved = tracker.process(ContactEvent::Sync);
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].phase, TouchPhase::Move);
    assert_eq!(moved[0].touches[0].position.x, 40.0);

    tracker.process(ContactEvent::TrackingId(-1));
    let ended = tracker.process(ContactEvent::Sync);
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].phase, TouchPhase::End);
    assert!(ended[0].touches.is_empty());
    assert_eq!(ended[0].changed[0].position.x, 40.0);
    assert_eq!(tracker.active_count(), 0);
}

#[test]
fn test_second_finger_reports_both_touches() {
    let mut tracker = create_tracker();
    press(&mut tracker, 0, 1, 100, 100);
    let inputs = press(&mut tracker, 1, 2, 900, 900);

    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].phase, TouchPhase::Start);
    assert_eq!(inputs[0].touches.len(), 2);
    assert_eq!(inputs[0].changed, vec![TouchPoint::new(2, 180.0, 90.0)]);

    // lifting one finger leaves the other down
    tracker.process(ContactEvent::Slot(1));
    tracker.process(ContactEvent::TrackingId(-1));
    let ended = tracker.process(ContactEvent::Sync);
    assert_eq!(ended[0].phase, TouchPhase::End);
    assert_eq!(ended[0].touches.len(), 1);
    assert_eq!(ended[0].touches[0].id, 1);
}

#[test]
fn test_cancel_all_releases_active_fingers() {
    let mut tracker = create_tracker();
    assert!(tracker.cancel_all().is_none());

    press(&mut tracker, 0, 1, 100, 100);
    let cancel = tracker.cancel_all().unwrap();
    assert_eq!(cancel.phase, TouchPhase::Cancel);
    assert_eq!(cancel.changed.len(), 1);
    assert_eq!(tracker.active_count(), 0);
}

#[test]
fn test_touch_input_helpers() {
    let start = TouchInput::start(10.0, 20.0);
    assert_eq!(start.phase, TouchPhase::Start);
    assert_eq!(start.touches.len(), 1);

    let end = TouchInput::end(10.0, 20.0);
    assert!(end.touches.is_empty());
    assert_eq!(end.changed.len(), 1);

    let pair = TouchInput::pair(TouchPhase::Move, (0.0, 0.0), (10.0, 0.0));
    assert_eq!(pair.touches.len(), 2);
}

#[cfg(all(feature = "touchscreen", target_os = "linux"))]
mod evdev_mapping {
    use super::super::*;
    use evdev::{AbsoluteAxisType, EventType, InputEvent, Synchronization};

    #[test]
    fn test_map_multitouch_events() {
        let slot = InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_MT_SLOT.0, 1);
        let x = InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_MT_POSITION_X.0, 42);
        let sync = InputEvent::new(EventType::SYNCHRONIZATION, Synchronization::SYN_REPORT.0, 0);
        let other = InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_PRESSURE.0, 9);

        assert_eq!(TouchInputHandler::map_event(&slot), Some(ContactEvent::Slot(1)));
        assert_eq!(TouchInputHandler::map_event(&x), Some(ContactEvent::PositionX(42)));
        assert_eq!(TouchInputHandler::map_event(&sync), Some(ContactEvent::Sync));
        assert_eq!(TouchInputHandler::map_event(&other), None);
    }

    #[test]
    fn test_missing_device_is_categorized() {
        let config = crate::config::DisplayConfig {
            touch_device: "/dev/input/does-not-exist".to_string(),
            ..crate::config::PhotoboothConfig::default().display
        };
        let handler = TouchInputHandler::new(&config);
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let result = handler.start(tokio_util::sync::CancellationToken::new(), tx);
        assert!(matches!(
            result,
            Err(crate::error::TouchError::DeviceNotFound(_))
        ));
    }

    /// Replays queued events, then waits forever like an idle touchscreen
    struct ScriptedSource {
        events: std::collections::VecDeque<InputEvent>,
        fail: bool,
    }

    impl ScriptedSource {
        fn new(events: Vec<InputEvent>) -> Self {
            Self {
                events: events.into(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                events: Default::default(),
                fail: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl super::super::handler::RawEventSource for ScriptedSource {
        async fn next_event(&mut self) -> std::io::Result<InputEvent> {
            if self.fail {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "read failed"));
            }
            match self.events.pop_front() {
                Some(event) => Ok(event),
                None => std::future::pending().await,
            }
        }
    }

    fn abs(axis: AbsoluteAxisType, value: i32) -> InputEvent {
        InputEvent::new(EventType::ABSOLUTE, axis.0, value)
    }

    fn finger_down() -> Vec<InputEvent> {
        vec![
            abs(AbsoluteAxisType::ABS_MT_SLOT, 0),
            abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, 7),
            abs(AbsoluteAxisType::ABS_MT_POSITION_X, 500),
            abs(AbsoluteAxisType::ABS_MT_POSITION_Y, 500),
            InputEvent::new(EventType::SYNCHRONIZATION, Synchronization::SYN_REPORT.0, 0),
        ]
    }

    #[tokio::test]
    async fn test_reader_stops_promptly_when_cancelled_while_idle() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let cancel = tokio_util::sync::CancellationToken::new();
        let reader = tokio::spawn(super::super::handler::forward_events(
            ScriptedSource::new(finger_down()),
            super::create_tracker(),
            cancel.clone(),
            tx,
            "/dev/input/test".to_string(),
        ));

        let start = rx.recv().await.unwrap();
        assert_eq!(start.phase, TouchPhase::Start);

        cancel.cancel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(1), reader)
            .await
            .expect("reader did not stop after cancellation")
            .unwrap();
        assert!(result.is_ok());

        let cancelled = rx.recv().await.unwrap();
        assert_eq!(cancelled.phase, TouchPhase::Cancel);
        assert_eq!(cancelled.changed.len(), 1);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reader_gives_up_after_repeated_errors() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let result = super::super::handler::forward_events(
            ScriptedSource::failing(),
            super::create_tracker(),
            tokio_util::sync::CancellationToken::new(),
            tx,
            "/dev/input/test".to_string(),
        )
        .await;

        assert!(matches!(
            result,
            Err(crate::error::TouchError::DeviceRead { .. })
        ));
    }
}
