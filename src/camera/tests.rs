use super::*;
use crate::config::CameraConfig;
use crate::error::CameraError;
use std::sync::Arc;

fn create_test_config() -> CameraConfig {
    CameraConfig {
        facing_mode: FacingMode::Environment,
        environment_device: 0,
        user_device: 1,
        ideal_resolution: (4096, 4096),
        frame_retry_delay_ms: 1,
        frame_retry_limit: 10,
    }
}

fn create_surface(camera: &SyntheticCamera, display: (u32, u32)) -> CaptureSurface {
    CaptureSurface::new(create_test_config(), Arc::new(camera.clone()), display)
}

#[test]
fn test_crop_wider_video_trims_width() {
    let region = crop_region((1920, 1080), (1080, 1080));
    assert_eq!(
        region,
        CropRegion {
            x: 420,
            y: 0,
            width: 1080,
            height: 1080
        }
    );
}

#[test]
fn test_crop_taller_video_trims_height() {
    let region = crop_region((1080, 1920), (400, 300));
    assert_eq!(region.x, 0);
    assert_eq!(region.width, 1080);
    assert_eq!(region.height, 810);
    assert_eq!(region.y, 555);
}

#[test]
fn test_crop_matching_ratio_keeps_frame() {
    let region = crop_region((1280, 960), (640, 480));
    assert_eq!(
        region,
        CropRegion {
            x: 0,
            y: 0,
            width: 1280,
            height: 960
        }
    );
}

#[test]
fn test_facing_mode_parsing_and_toggle() {
    assert_eq!("user".parse::<FacingMode>().unwrap(), FacingMode::User);
    assert_eq!("Environment".parse::<FacingMode>().unwrap(), FacingMode::Environment);
    assert!("sideways".parse::<FacingMode>().is_err());
    assert_eq!(FacingMode::User.toggled(), FacingMode::Environment);
    assert!(FacingMode::User.is_mirrored());
    assert!(!FacingMode::Environment.is_mirrored());
}

#[tokio::test]
async fn test_start_sends_facing_and_ideal_resolution() {
    let camera = SyntheticCamera::new(640, 480);
    let mut surface = create_surface(&camera, (320, 240));

    let resolution = surface.start(FacingMode::User).await.unwrap();

    assert_eq!(resolution, (640, 480));
    assert!(surface.is_streaming());
    assert_eq!(surface.view_mode(), ViewMode::Live);
    let request = camera.last_request().unwrap();
    assert_eq!(request.facing, FacingMode::User);
    assert_eq!(request.ideal_resolution, (4096, 4096));
}

#[tokio::test]
async fn test_start_upgrades_to_max_resolution() {
    let camera = SyntheticCamera::new(640, 480).with_max_resolution(1280, 960);
    let mut surface = create_surface(&camera, (320, 240));

    let resolution = surface.start(FacingMode::Environment).await.unwrap();
    assert_eq!(resolution, (1280, 960));
}

#[tokio::test]
async fn test_rejected_upgrade_is_not_fatal() {
    let camera = SyntheticCamera::new(640, 480)
        .with_max_resolution(1280, 960)
        .rejecting_upgrades();
    let mut surface = create_surface(&camera, (320, 240));

    let resolution = surface.start(FacingMode::Environment).await.unwrap();
    assert_eq!(resolution, (640, 480));
    assert!(surface.is_streaming());
}

#[tokio::test]
async fn test_start_failure_is_reported() {
    let camera = SyntheticCamera::new(640, 480).with_failure(CameraError::PermissionDenied);
    let mut surface = create_surface(&camera, (320, 240));

    let result = surface.start(FacingMode::Environment).await;
    assert_eq!(result, Err(CameraError::PermissionDenied));
    assert!(!surface.is_streaming());
}

#[tokio::test]
async fn test_restart_stops_previous_tracks() {
    let camera = SyntheticCamera::new(640, 480);
    let mut surface = create_surface(&camera, (320, 240));

    surface.start(FacingMode::Environment).await.unwrap();
    surface.start(FacingMode::User).await.unwrap();

    assert_eq!(camera.opened_streams(), 2);
    assert_eq!(camera.active_streams(), 1);

    surface.stop();
    assert_eq!(camera.active_streams(), 0);
}

#[tokio::test]
async fn test_capture_matches_display_size() {
    let camera = SyntheticCamera::new(640, 480);
    let mut surface = create_surface(&camera, (200, 300));
    surface.start(FacingMode::Environment).await.unwrap();

    let raster = surface.capture().await.unwrap();
    assert_eq!(raster.dimensions(), (200, 300));
}

#[tokio::test]
async fn test_capture_mirrors_user_facing() {
    let camera = SyntheticCamera::new(400, 300);
    let mut surface = create_surface(&camera, (400, 300));

    surface.start(FacingMode::Environment).await.unwrap();
    let normal = surface.capture().await.unwrap();
    assert_eq!(*normal.get_pixel(10, 150), SyntheticCamera::LEFT_COLOR);
    assert_eq!(*normal.get_pixel(390, 150), SyntheticCamera::RIGHT_COLOR);

    surface.start(FacingMode::User).await.unwrap();
    let mirrored = surface.capture().await.unwrap();
    assert_eq!(*mirrored.get_pixel(10, 150), SyntheticCamera::RIGHT_COLOR);
    assert_eq!(*mirrored.get_pixel(390, 150), SyntheticCamera::LEFT_COLOR);
}

#[tokio::test]
async fn test_capture_waits_for_first_frame() {
    let camera = SyntheticCamera::new(320, 240).with_warmup(3);
    let mut surface = create_surface(&camera, (320, 240));
    surface.start(FacingMode::Environment).await.unwrap();

    assert!(surface.capture().await.is_ok());
}

#[tokio::test]
async fn test_capture_retry_is_bounded() {
    let camera = SyntheticCamera::new(320, 240).with_warmup(1000);
    let mut surface = create_surface(&camera, (320, 240));
    surface.start(FacingMode::Environment).await.unwrap();

    let result = surface.capture().await;
    assert_eq!(result, Err(CameraError::FrameTimeout { attempts: 10 }));
}

#[tokio::test]
async fn test_capture_without_stream_fails() {
    let camera = SyntheticCamera::new(320, 240);
    let mut surface = create_surface(&camera, (320, 240));
    assert_eq!(surface.capture().await, Err(CameraError::NotStarted));
}
