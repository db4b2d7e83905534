use super::*;
use crate::camera::{FacingMode, SyntheticCamera, ViewMode};
use crate::config::{PhotoboothConfig, StickerTab};
use crate::dial::DialAction;
use crate::error::CameraError;
use crate::events::{EventBus, PhotoboothEvent};
use crate::geofence::FixedLocation;
use crate::overlay::InteractionMode;
use crate::preview::ShareOutcome;
use crate::touch::TouchInput;
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::broadcast;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn create_test_config(output_dir: &TempDir) -> PhotoboothConfig {
    let mut config = PhotoboothConfig::default();
    config.display.resolution = (200, 300);
    config.display.device_pixel_ratio = 1.0;
    config.camera.frame_retry_delay_ms = 1;
    config.camera.frame_retry_limit = 5;
    config.export.output_dir = output_dir.path().to_string_lossy().to_string();
    config
}

fn create_booth(config: PhotoboothConfig, camera: &SyntheticCamera) -> PhotoBooth {
    PhotoBooth::builder()
        .with_config(config)
        .with_camera(Arc::new(camera.clone()))
        .build()
        .unwrap()
}

fn drain(rx: &mut broadcast::Receiver<PhotoboothEvent>) -> Vec<PhotoboothEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn is_red(pixel: &Rgba<u8>) -> bool {
    pixel[0] > 200 && pixel[1] < 60 && pixel[2] < 60
}

#[test]
fn test_builder_requires_camera() {
    let result = PhotoBooth::builder()
        .with_config(PhotoboothConfig::default())
        .build();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_initialize_starts_camera_and_welcomes() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    let mut rx = booth.event_bus().subscribe();

    assert!(!booth.controls().all_enabled());
    assert!(booth.initialize().await);

    assert!(booth.controls().all_enabled());
    assert_eq!(booth.modal(), Some(&ModalMessage::Welcome));
    assert_eq!(booth.view_mode(), ViewMode::Live);
    assert_eq!(camera.active_streams(), 1);

    assert!(booth.dismiss_modal());
    assert!(booth.modal().is_none());

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [PhotoboothEvent::CameraStarted {
            facing: FacingMode::Environment,
            ..
        }]
    ));
}

#[tokio::test]
async fn test_access_denied_blocks_camera() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.geofence.enabled = true;

    let camera = SyntheticCamera::new(640, 480);
    let mut booth = PhotoBooth::builder()
        .with_config(config)
        .with_camera(Arc::new(camera.clone()))
        .with_location(Arc::new(FixedLocation::new(51.5074, -0.1278)))
        .build()
        .unwrap();
    let mut rx = booth.event_bus().subscribe();

    assert!(!booth.initialize().await);
    assert_eq!(camera.opened_streams(), 0);
    assert!(!booth.controls().shutter);

    let modal = booth.modal().cloned().unwrap();
    assert!(!modal.is_dismissible());
    assert!(modal.text().unwrap().contains("outside the designated area"));
    assert!(!booth.dismiss_modal());

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [PhotoboothEvent::AccessChecked { allowed: false, .. }]
    ));
}

#[tokio::test]
async fn test_access_granted_inside_area() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.geofence.enabled = true;
    let (lat, lng) = (config.geofence.latitude, config.geofence.longitude);

    let camera = SyntheticCamera::new(640, 480);
    let mut booth = PhotoBooth::builder()
        .with_config(config)
        .with_camera(Arc::new(camera.clone()))
        .with_location(Arc::new(FixedLocation::new(lat, lng)))
        .build()
        .unwrap();

    assert!(booth.initialize().await);
    assert_eq!(camera.active_streams(), 1);
}

#[tokio::test]
async fn test_camera_failure_disables_controls() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480).with_failure(CameraError::PermissionDenied);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    let mut rx = booth.event_bus().subscribe();

    assert!(!booth.initialize().await);
    assert_eq!(booth.controls(), ControlState::disabled());
    assert!(booth.modal().unwrap().text().unwrap().contains("denied"));
    assert!(booth.add_sticker_image(RgbaImage::new(10, 10)).is_err());
    assert!(booth.capture().await.is_err());

    let events = drain(&mut rx);
    assert!(matches!(events.as_slice(), [PhotoboothEvent::CameraFailed { .. }]));
}

#[tokio::test]
async fn test_toggle_facing_reopens_camera() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    booth.initialize().await;

    assert!(booth.toggle_facing().await);
    assert_eq!(booth.facing(), FacingMode::User);
    assert_eq!(camera.last_request().unwrap().facing, FacingMode::User);
    assert_eq!(camera.active_streams(), 1);
    assert_eq!(camera.opened_streams(), 2);
}

#[tokio::test]
async fn test_drag_sticker_and_capture() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    assert!(booth.initialize().await);
    let mut rx = booth.event_bus().subscribe();

    let id = booth
        .add_sticker_image(RgbaImage::from_pixel(40, 40, RED))
        .unwrap();
    assert_eq!(booth.scene().selected(), Some(id));

    booth.handle_touch(&TouchInput::start(100.0, 150.0));
    booth.handle_touch(&TouchInput::moved(150.0, 150.0));
    booth.handle_touch(&TouchInput::end(150.0, 150.0));

    let center = booth.scene().get(id).unwrap().center();
    assert!((center.x - 150.0).abs() < 1e-9);
    assert!((center.y - 150.0).abs() < 1e-9);

    let session = booth.capture().await.unwrap();
    assert_eq!((session.width, session.height), (200, 300));
    let photo = image::load_from_memory(&session.png).unwrap().to_rgba8();
    assert!(is_red(photo.get_pixel(150, 150)));
    assert!(!is_red(photo.get_pixel(100, 150)));

    assert_eq!(camera.active_streams(), 0);
    assert_eq!(booth.view_mode(), ViewMode::Frozen);
    assert!(booth.scene().selected().is_none());

    let events = drain(&mut rx);
    assert!(events.contains(&PhotoboothEvent::StickerAdded { id: id.0 }));
    assert!(events.contains(&PhotoboothEvent::CameraStopped));
    assert!(events.contains(&PhotoboothEvent::PhotoCaptured {
        width: 200,
        height: 300
    }));
}

#[tokio::test]
async fn test_capture_scales_overlay_on_dense_display() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.display.device_pixel_ratio = 2.0;
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(config, &camera);
    booth.initialize().await;
    assert_eq!(booth.scene().raster_size(), (400, 600));

    booth
        .add_sticker_image(RgbaImage::from_pixel(40, 40, RED))
        .unwrap();
    let session = booth.capture().await.unwrap();
    assert_eq!((session.width, session.height), (200, 300));

    let photo = image::load_from_memory(&session.png).unwrap().to_rgba8();
    assert!(is_red(photo.get_pixel(100, 150)));
    assert!(!is_red(photo.get_pixel(10, 10)));
}

#[tokio::test]
async fn test_capture_applies_bottom_frame() {
    let dir = TempDir::new().unwrap();
    let frame_path = dir.path().join("bottom.png");
    RgbaImage::from_pixel(200, 20, Rgba([0, 0, 255, 255]))
        .save(&frame_path)
        .unwrap();

    let mut config = create_test_config(&dir);
    config.frames.bottom = Some(frame_path.to_string_lossy().to_string());
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(config, &camera);
    booth.initialize().await;

    let session = booth.capture().await.unwrap();
    let photo = image::load_from_memory(&session.png).unwrap().to_rgba8();
    assert_eq!(photo.get_pixel(10, 295), &Rgba([0, 0, 255, 255]));
    assert_ne!(photo.get_pixel(10, 10), &Rgba([0, 0, 255, 255]));
}

#[tokio::test]
async fn test_close_preview_restarts_camera() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    booth.initialize().await;
    booth.capture().await.unwrap();
    assert!(booth.preview().is_open());

    assert!(booth.close_preview().await);
    assert!(!booth.preview().is_open());
    assert_eq!(booth.view_mode(), ViewMode::Live);
    assert_eq!(camera.active_streams(), 1);
    assert_eq!(camera.opened_streams(), 2);
}

#[tokio::test]
async fn test_save_and_share_fallback() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    booth.initialize().await;
    booth.dismiss_modal();
    booth.capture().await.unwrap();
    let mut rx = booth.event_bus().subscribe();

    let saved = booth.save_photo().await.unwrap();
    assert!(saved.exists());

    match booth.share_photo().await.unwrap() {
        ShareOutcome::SavedInstead { path, .. } => assert!(path.exists()),
        other => panic!("expected save fallback, got {:?}", other),
    }
    assert!(matches!(booth.modal(), Some(ModalMessage::Notice(_))));
    assert!(booth.dismiss_modal());

    let events = drain(&mut rx);
    assert!(matches!(events[0], PhotoboothEvent::PhotoSaved { .. }));
    assert!(matches!(events[1], PhotoboothEvent::ShareFallback { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_opening_sheet_dismisses_dial() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    booth.initialize().await;

    let id = booth
        .add_sticker_image(RgbaImage::from_pixel(40, 40, RED))
        .unwrap();
    booth.handle_touch(&TouchInput::start(100.0, 150.0));
    booth.wait_for_long_press().await;
    assert!(booth.dial_view().open);
    assert_eq!(
        booth.scene().get(id).unwrap().mode(),
        InteractionMode::Frozen
    );

    booth.open_sheet();
    assert!(booth.sheet().is_open());
    assert!(!booth.dial_view().open);
    assert_eq!(
        booth.scene().get(id).unwrap().mode(),
        InteractionMode::Interactive
    );
}

#[tokio::test(start_paused = true)]
async fn test_dial_button_locks_sticker() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    booth.initialize().await;
    let mut rx = booth.event_bus().subscribe();

    let id = booth
        .add_sticker_image(RgbaImage::from_pixel(40, 40, RED))
        .unwrap();
    booth.handle_touch(&TouchInput::start(100.0, 150.0));
    booth.wait_for_long_press().await;
    assert!(booth.dial_view().open);
    assert_eq!(booth.dial_view().lock_label(), "Lock");

    booth.tap_dial_button(DialAction::ToggleLock);
    assert!(!booth.dial_view().open);
    assert!(booth.scene().get(id).unwrap().is_locked());

    let events = drain(&mut rx);
    assert!(events.contains(&PhotoboothEvent::StickerLockChanged {
        id: id.0,
        locked: true
    }));
    assert!(events.contains(&PhotoboothEvent::DialClosed));
}

#[tokio::test]
async fn test_sticker_sheet_tabs() {
    let dir = TempDir::new().unwrap();
    let sticker_path = dir.path().join("star.png");
    RgbaImage::from_pixel(30, 30, RED).save(&sticker_path).unwrap();

    let mut config = create_test_config(&dir);
    config.stickers.tabs = vec![
        StickerTab {
            name: "animals".to_string(),
            images: vec!["missing.png".to_string()],
        },
        StickerTab {
            name: "shapes".to_string(),
            images: vec![sticker_path.to_string_lossy().to_string()],
        },
    ];
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(config, &camera);
    booth.initialize().await;

    assert!(booth.toggle_sheet());
    assert_eq!(booth.sheet().active_tab().unwrap().name, "animals");
    assert!(booth.activate_tab("plants").is_err());
    booth.activate_tab("shapes").unwrap();

    let id = booth.add_sticker_from_sheet(0).await.unwrap();
    assert!(!booth.sheet().is_open());
    assert_eq!(booth.scene().get(id).unwrap().image().dimensions(), (30, 30));
    assert!(booth.add_sticker_from_sheet(3).await.is_err());

    booth.open_sheet();
    assert_eq!(booth.sheet().active_tab().unwrap().name, "shapes");
    assert!(!booth.toggle_sheet());
}

#[tokio::test]
async fn test_resize_updates_surface_and_scene() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let mut booth = create_booth(create_test_config(&dir), &camera);

    booth.resize(300.0, 200.0, 2.0);
    assert_eq!(booth.surface().display_size(), (300, 200));
    assert_eq!(booth.scene().raster_size(), (600, 400));
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480);
    let bus = Arc::new(EventBus::new(16));
    let mut booth = PhotoBooth::builder()
        .with_config(create_test_config(&dir))
        .with_camera(Arc::new(camera.clone()))
        .with_event_bus(Arc::clone(&bus))
        .build()
        .unwrap();
    booth.initialize().await;
    booth
        .add_sticker_image(RgbaImage::from_pixel(40, 40, RED))
        .unwrap();

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let cancel = tokio_util::sync::CancellationToken::new();
    tx.send(TouchInput::start(10.0, 10.0)).unwrap();
    tx.send(TouchInput::end(10.0, 10.0)).unwrap();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let reason = booth.run(rx, cancel).await;
    assert_eq!(reason, ShutdownReason::UserRequest);
    assert!(booth.scene().selected().is_none());
    assert_eq!(camera.active_streams(), 0);
    assert_eq!(booth.controls(), ControlState::disabled());
}

#[tokio::test]
async fn test_capture_timeout_reports_system_error() {
    let dir = TempDir::new().unwrap();
    let camera = SyntheticCamera::new(640, 480).with_warmup(1000);
    let mut booth = create_booth(create_test_config(&dir), &camera);
    booth.initialize().await;
    let mut rx = booth.event_bus().subscribe();

    assert!(booth.capture().await.is_err());
    assert_eq!(booth.view_mode(), ViewMode::Live);
    assert_eq!(camera.active_streams(), 1);

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [PhotoboothEvent::SystemError { component, .. }] if component == "camera"
    ));
}
