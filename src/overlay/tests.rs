use super::*;
use crate::config::OverlayConfig;
use crate::error::PhotoboothError;
use crate::geometry::Point;
use image::{Rgba, RgbaImage};
use std::sync::Arc;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn assert_red(pixel: &Rgba<u8>) {
    assert!(
        pixel[0] >= 250 && pixel[1] <= 5 && pixel[2] <= 5 && pixel[3] >= 250,
        "expected red, got {:?}",
        pixel
    );
}

fn create_scene() -> Scene {
    Scene::new(OverlayConfig::default(), (200.0, 300.0), 1.0)
}

fn red_square() -> Arc<RgbaImage> {
    Arc::new(RgbaImage::from_pixel(40, 40, RED))
}

#[test]
fn test_pinch_scale_is_clamped() {
    assert_eq!(pinch_scale(1.0, 100.0, 0.1, 5.0), 5.0);
    assert_eq!(pinch_scale(1.0, 0.001, 0.1, 5.0), 0.1);
    assert_eq!(pinch_scale(2.0, 1.5, 0.1, 5.0), 3.0);
}

#[test]
fn test_pinch_session_scale_and_rotation() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());
    let sticker = scene.get(id).unwrap();

    let session = PinchSession::begin(sticker, Point::new(0.0, 0.0), Point::new(10.0, 0.0));

    match session.update(Point::new(0.0, 0.0), Point::new(0.0, 20.0), 0.1, 5.0) {
        StickerTransform::ScaleRotate { scale, angle } => {
            assert!((scale - 2.0).abs() < 1e-9);
            assert!((angle - 90.0).abs() < 1e-9);
        }
        other => panic!("unexpected transform {:?}", other),
    }

    match session.update(Point::new(0.0, 0.0), Point::new(1000.0, 0.0), 0.1, 5.0) {
        StickerTransform::ScaleRotate { scale, .. } => assert_eq!(scale, 5.0),
        other => panic!("unexpected transform {:?}", other),
    }
}

#[test]
fn test_drag_session_reports_incremental_offsets() {
    let mut drag = DragSession::new(StickerId(1), Point::new(10.0, 10.0));
    assert_eq!(
        drag.update(Point::new(15.0, 12.0)),
        StickerTransform::Translate { dx: 5.0, dy: 2.0 }
    );
    assert_eq!(
        drag.update(Point::new(15.0, 20.0)),
        StickerTransform::Translate { dx: 0.0, dy: 8.0 }
    );
}

#[test]
fn test_add_sticker_centers_and_selects() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());
    let sticker = scene.get(id).unwrap();

    assert_eq!(sticker.center(), Point::new(100.0, 150.0));
    // 30% of the shorter side (200) over a 40px image
    assert!((sticker.base_scale() - 1.5).abs() < 1e-9);
    assert_eq!(sticker.size(), (60.0, 60.0));
    assert_eq!(scene.selected(), Some(id));
}

#[test]
fn test_selection_is_exclusive() {
    let mut scene = create_scene();
    let first = scene.add_sticker(red_square());
    let second = scene.add_sticker(red_square());
    assert_eq!(scene.selected(), Some(second));

    scene.select(first).unwrap();
    assert_eq!(scene.selected(), Some(first));

    assert!(matches!(
        scene.select(StickerId(99)),
        Err(PhotoboothError::StickerNotFound { id: 99 })
    ));
    assert_eq!(scene.selected(), Some(first));
}

#[test]
fn test_lock_unlock_lock_matches_single_lock() {
    let mut scene = create_scene();
    let once = scene.add_sticker(red_square());
    let thrice = scene.add_sticker(red_square());

    assert!(scene.toggle_lock(once).unwrap());

    assert!(scene.toggle_lock(thrice).unwrap());
    assert!(!scene.toggle_lock(thrice).unwrap());
    assert!(scene.toggle_lock(thrice).unwrap());

    let a = scene.get(once).unwrap();
    let b = scene.get(thrice).unwrap();
    assert_eq!(a.permissions(), b.permissions());
    assert_eq!(a.mode(), InteractionMode::Locked);
    assert!(a.permissions().selectable);
    assert!(!a.permissions().movable);
    assert_eq!(a.opacity(), b.opacity());
}

#[test]
fn test_unlock_restores_full_interactivity() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());
    scene.toggle_lock(id).unwrap();
    assert!((scene.get(id).unwrap().opacity() - 0.95).abs() < 1e-9);

    scene.toggle_lock(id).unwrap();
    let sticker = scene.get(id).unwrap();
    assert_eq!(sticker.mode(), InteractionMode::Interactive);
    assert_eq!(sticker.permissions(), InteractionMode::Interactive.permissions());
    assert_eq!(sticker.opacity(), 1.0);
}

#[test]
fn test_locked_sticker_rejects_transforms() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());
    scene.toggle_lock(id).unwrap();

    let moved = scene
        .transform_by_gesture(id, StickerTransform::Translate { dx: 10.0, dy: 0.0 })
        .unwrap();
    let scaled = scene
        .transform_by_gesture(id, StickerTransform::ScaleRotate { scale: 2.0, angle: 30.0 })
        .unwrap();

    assert!(!moved);
    assert!(!scaled);
    let sticker = scene.get(id).unwrap();
    assert_eq!(sticker.center(), Point::new(100.0, 150.0));
    assert_eq!(sticker.scale(), 1.0);
    assert_eq!(sticker.angle(), 0.0);
    // still hit-testable
    assert_eq!(scene.hit_test(Point::new(100.0, 150.0)), Some(id));
}

#[test]
fn test_freeze_and_unfreeze_transitions() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());

    assert!(scene.freeze(id).unwrap());
    assert!(!scene
        .transform_by_gesture(id, StickerTransform::Translate { dx: 5.0, dy: 5.0 })
        .unwrap());
    assert!(scene.unfreeze(id));
    assert_eq!(scene.get(id).unwrap().mode(), InteractionMode::Interactive);

    // locking while frozen survives the unfreeze
    scene.freeze(id).unwrap();
    scene.toggle_lock(id).unwrap();
    assert!(!scene.unfreeze(id));
    assert!(scene.get(id).unwrap().is_locked());

    // a locked sticker cannot be frozen
    assert!(!scene.freeze(id).unwrap());

    // unfreezing a removed sticker is a no-op
    scene.remove(id).unwrap();
    assert!(!scene.unfreeze(id));
}

#[test]
fn test_scale_is_clamped_on_transform() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());

    scene
        .transform_by_gesture(id, StickerTransform::ScaleRotate { scale: 100.0, angle: 0.0 })
        .unwrap();
    assert_eq!(scene.get(id).unwrap().scale(), 5.0);

    scene
        .transform_by_gesture(id, StickerTransform::ScaleRotate { scale: 0.001, angle: 0.0 })
        .unwrap();
    assert_eq!(scene.get(id).unwrap().scale(), 0.1);
}

#[test]
fn test_z_order_operations() {
    let mut scene = create_scene();
    let a = scene.add_sticker(red_square());
    let b = scene.add_sticker(red_square());
    let c = scene.add_sticker(red_square());
    assert_eq!(scene.order(), vec![a, b, c]);

    scene.bring_to_front(a).unwrap();
    assert_eq!(scene.order(), vec![b, c, a]);

    scene.bring_to_front(a).unwrap();
    assert_eq!(scene.order(), vec![b, c, a]);

    scene.send_to_back(c).unwrap();
    assert_eq!(scene.order(), vec![c, b, a]);
}

#[test]
fn test_hit_test_prefers_topmost_with_tolerance() {
    let mut scene = create_scene();
    let bottom = scene.add_sticker(red_square());
    let top = scene.add_sticker(red_square());

    assert_eq!(scene.hit_test(Point::new(100.0, 150.0)), Some(top));

    scene.send_to_back(top).unwrap();
    assert_eq!(scene.hit_test(Point::new(100.0, 150.0)), Some(bottom));

    // half size 30 plus tolerance 12
    assert!(scene.hit_test(Point::new(141.0, 150.0)).is_some());
    assert!(scene.hit_test(Point::new(143.0, 150.0)).is_none());
}

#[test]
fn test_hit_test_accounts_for_rotation() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());
    let probe = Point::new(145.0, 150.0);
    assert!(scene.hit_test(probe).is_none());

    scene
        .transform_by_gesture(id, StickerTransform::ScaleRotate { scale: 1.0, angle: 45.0 })
        .unwrap();
    assert_eq!(scene.hit_test(probe), Some(id));
}

#[test]
fn test_find_target_respects_switch() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());
    let center = Point::new(100.0, 150.0);

    assert_eq!(scene.find_target(center), Some(id));
    scene.set_target_find(false);
    assert_eq!(scene.find_target(center), None);
    assert_eq!(scene.hit_test(center), Some(id));
}

#[test]
fn test_remove_clears_selection() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());
    scene.remove(id).unwrap();

    assert!(scene.is_empty());
    assert_eq!(scene.selected(), None);
    assert!(scene.remove(id).is_err());
}

#[test]
fn test_resize_sets_raster_and_css_size() {
    let mut scene = create_scene();

    scene.resize(200.0, 150.0, 2.0);
    assert_eq!(scene.raster_size(), (400, 300));
    assert_eq!(scene.css_size(), (200.0, 150.0));

    scene.resize(100.4, 50.6, 1.5);
    assert_eq!(scene.raster_size(), (151, 76));
    assert_eq!(scene.css_size(), (100.4, 50.6));
}

#[test]
fn test_flatten_renders_without_selection() {
    let mut scene = create_scene();
    scene.add_sticker(red_square());

    let raster = scene.flatten();

    assert_eq!(raster.dimensions(), (200, 300));
    assert_red(raster.get_pixel(100, 150));
    assert_eq!(raster.get_pixel(5, 5)[3], 0);
    assert_eq!(scene.selected(), None);
}

#[test]
fn test_render_draws_selection_corners_in_accent() {
    let mut scene = create_scene();
    scene.add_sticker(red_square());

    let raster = scene.render();

    // top-left corner handle of the 60x60 sticker centered at (100, 150)
    assert_eq!(*raster.get_pixel(70, 120), Rgba([255, 91, 130, 255]));
}

#[test]
fn test_render_scales_with_device_pixel_ratio() {
    let mut scene = Scene::new(OverlayConfig::default(), (100.0, 100.0), 2.0);
    scene.add_sticker(red_square());

    let raster = scene.flatten();

    assert_eq!(raster.dimensions(), (200, 200));
    // 30 css px wide around (50, 50): 70..130 device pixels
    assert_red(raster.get_pixel(100, 100));
    assert_red(raster.get_pixel(75, 125));
    assert_eq!(raster.get_pixel(65, 100)[3], 0);
    assert_eq!(raster.get_pixel(100, 135)[3], 0);
}

#[test]
fn test_scaled_sticker_keeps_last_row_and_column() {
    let mut scene = Scene::new(OverlayConfig::default(), (100.0, 100.0), 2.0);
    scene.add_sticker(red_square());

    let raster = scene.flatten();

    // 40 px image at 1.5x covers device pixels 70..130
    assert!(raster.get_pixel(129, 100)[3] > 0);
    assert!(raster.get_pixel(100, 129)[3] > 0);
    assert!(raster.get_pixel(129, 129)[3] > 0);
    assert_eq!(raster.get_pixel(131, 100)[3], 0);
    assert_eq!(raster.get_pixel(100, 131)[3], 0);
}

#[test]
fn test_locked_sticker_renders_dimmed() {
    let mut scene = create_scene();
    let id = scene.add_sticker(red_square());
    scene.toggle_lock(id).unwrap();

    let raster = scene.flatten();
    let alpha = raster.get_pixel(100, 150)[3];
    assert!(alpha < 255 && alpha > 230, "alpha {}", alpha);
}
