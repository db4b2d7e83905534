use crate::geometry::Point;
use image::RgbaImage;
use std::fmt;
use std::sync::Arc;

/// Identifier assigned to a sticker when it is added to a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StickerId(pub u64);

impl fmt::Display for StickerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a sticker currently responds to manipulation.
///
/// `Frozen` only exists while the action dial is open for the sticker; the
/// dial can only move a sticker from `Frozen` back to `Interactive` or on to
/// `Locked`, so no permission snapshot has to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Interactive,
    Frozen,
    Locked,
}

/// What a sticker in a given mode accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub movable: bool,
    pub scalable: bool,
    pub rotatable: bool,
    pub controls_visible: bool,
    pub selectable: bool,
}

impl InteractionMode {
    pub fn permissions(self) -> Permissions {
        match self {
            InteractionMode::Interactive => Permissions {
                movable: true,
                scalable: true,
                rotatable: true,
                controls_visible: true,
                selectable: true,
            },
            InteractionMode::Frozen | InteractionMode::Locked => Permissions {
                movable: false,
                scalable: false,
                rotatable: false,
                controls_visible: false,
                selectable: true,
            },
        }
    }
}

/// One placed decorative image
#[derive(Debug, Clone)]
pub struct StickerObject {
    id: StickerId,
    image: Arc<RgbaImage>,
    center: Point,
    /// Fit factor giving the default on-screen size
    base_scale: f64,
    /// User scale, kept within the scene's bounds
    scale: f64,
    /// Rotation in degrees, clockwise on screen
    angle: f64,
    mode: InteractionMode,
    opacity: f64,
}

impl StickerObject {
    pub fn new(id: StickerId, image: Arc<RgbaImage>, center: Point, base_scale: f64) -> Self {
        Self {
            id,
            image,
            center,
            base_scale,
            scale: 1.0,
            angle: 0.0,
            mode: InteractionMode::Interactive,
            opacity: 1.0,
        }
    }

    pub fn id(&self) -> StickerId {
        self.id
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    /// Total factor from image pixels to CSS pixels
    pub fn effective_scale(&self) -> f64 {
        self.base_scale * self.scale
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn permissions(&self) -> Permissions {
        self.mode.permissions()
    }

    pub fn is_locked(&self) -> bool {
        self.mode == InteractionMode::Locked
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// On-screen width and height before rotation
    pub fn size(&self) -> (f64, f64) {
        let s = self.effective_scale();
        (self.image.width() as f64 * s, self.image.height() as f64 * s)
    }

    /// Whether `point` lies within the rotated bounds grown by `tolerance`
    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        let local = point.rotated_around(self.center, -self.angle.to_radians());
        let (w, h) = self.size();
        (local.x - self.center.x).abs() <= w / 2.0 + tolerance
            && (local.y - self.center.y).abs() <= h / 2.0 + tolerance
    }

    /// The four rotated corners, clockwise from top-left
    pub fn corners(&self) -> [Point; 4] {
        let (w, h) = self.size();
        let (hw, hh) = (w / 2.0, h / 2.0);
        let c = self.center;
        let rad = self.angle.to_radians();
        [
            Point::new(c.x - hw, c.y - hh).rotated_around(c, rad),
            Point::new(c.x + hw, c.y - hh).rotated_around(c, rad),
            Point::new(c.x + hw, c.y + hh).rotated_around(c, rad),
            Point::new(c.x - hw, c.y + hh).rotated_around(c, rad),
        ]
    }

    /// Move by (dx, dy). Returns false if the sticker cannot move.
    pub fn translate(&mut self, dx: f64, dy: f64) -> bool {
        if !self.permissions().movable {
            return false;
        }
        self.center = self.center.translated(dx, dy);
        true
    }

    /// Set the user scale clamped to `[min, max]`
    pub fn set_scale(&mut self, scale: f64, min: f64, max: f64) -> bool {
        if !self.permissions().scalable || !scale.is_finite() {
            return false;
        }
        self.scale = scale.clamp(min, max);
        true
    }

    pub fn set_angle(&mut self, degrees: f64) -> bool {
        if !self.permissions().rotatable || !degrees.is_finite() {
            return false;
        }
        self.angle = degrees;
        true
    }

    /// Suspend manipulation while the action dial is open.
    /// Only an interactive sticker can be frozen.
    pub fn freeze(&mut self) -> bool {
        if self.mode != InteractionMode::Interactive {
            return false;
        }
        self.mode = InteractionMode::Frozen;
        true
    }

    /// Leave the dial freeze. A sticker locked in the meantime stays locked.
    pub fn unfreeze(&mut self) -> bool {
        if self.mode != InteractionMode::Frozen {
            return false;
        }
        self.mode = InteractionMode::Interactive;
        true
    }

    pub fn set_locked(&mut self, locked: bool, locked_opacity: f64) {
        if locked {
            self.mode = InteractionMode::Locked;
            self.opacity = locked_opacity;
        } else {
            self.mode = InteractionMode::Interactive;
            self.opacity = 1.0;
        }
    }

    /// Flip the lock and return the new locked state
    pub fn toggle_lock(&mut self, locked_opacity: f64) -> bool {
        let locked = !self.is_locked();
        self.set_locked(locked, locked_opacity);
        locked
    }
}
