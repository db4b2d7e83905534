use super::sticker::{StickerId, StickerObject};
use crate::geometry::Point;

/// A change requested by a gesture, applied through `Scene::transform_by_gesture`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StickerTransform {
    /// Move the center by an offset
    Translate { dx: f64, dy: f64 },
    /// Set user scale (clamped by the scene) and rotation in degrees
    ScaleRotate { scale: f64, angle: f64 },
}

/// Single-finger drag of the selected sticker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub target: StickerId,
    last: Point,
}

impl DragSession {
    pub fn new(target: StickerId, start: Point) -> Self {
        Self { target, last: start }
    }

    /// Offset since the previous update
    pub fn update(&mut self, point: Point) -> StickerTransform {
        let (dx, dy) = self.last.delta_to(point);
        self.last = point;
        StickerTransform::Translate { dx, dy }
    }
}

/// Two-finger scale/rotate of the selected sticker, anchored at touch start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchSession {
    pub target: StickerId,
    pub initial_distance: f64,
    /// Radians
    pub initial_angle: f64,
    pub initial_scale: f64,
    /// Degrees
    pub initial_rotation: f64,
}

impl PinchSession {
    pub fn begin(sticker: &StickerObject, a: Point, b: Point) -> Self {
        Self {
            target: sticker.id(),
            initial_distance: a.distance_to(b),
            initial_angle: a.angle_to(b),
            initial_scale: sticker.scale(),
            initial_rotation: sticker.angle(),
        }
    }

    /// Scale and rotation for the current finger positions
    pub fn update(&self, a: Point, b: Point, min_scale: f64, max_scale: f64) -> StickerTransform {
        let ratio = if self.initial_distance > f64::EPSILON {
            a.distance_to(b) / self.initial_distance
        } else {
            1.0
        };
        StickerTransform::ScaleRotate {
            scale: pinch_scale(self.initial_scale, ratio, min_scale, max_scale),
            angle: self.initial_rotation + (a.angle_to(b) - self.initial_angle).to_degrees(),
        }
    }
}

/// Initial scale times the finger distance ratio, clamped to `[min, max]`
pub fn pinch_scale(initial_scale: f64, ratio: f64, min: f64, max: f64) -> f64 {
    (initial_scale * ratio).clamp(min, max)
}
