use super::gesture::StickerTransform;
use super::render;
use super::sticker::{StickerId, StickerObject};
use crate::config::OverlayConfig;
use crate::error::{PhotoboothError, Result};
use crate::geometry::Point;
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info};

/// Ordered stickers over the capture surface, back to front.
///
/// Coordinates are CSS pixels. The rendered raster carries the device pixel
/// ratio so its pixel size is `round(css * dpr)`.
pub struct Scene {
    config: OverlayConfig,
    stickers: Vec<StickerObject>,
    selected: Option<StickerId>,
    next_id: u64,
    css_size: (f64, f64),
    device_pixel_ratio: f64,
    target_find: bool,
    multi_select: bool,
}

impl Scene {
    pub fn new(config: OverlayConfig, css_size: (f64, f64), device_pixel_ratio: f64) -> Self {
        let mut scene = Self {
            config,
            stickers: Vec::new(),
            selected: None,
            next_id: 1,
            css_size: (1.0, 1.0),
            device_pixel_ratio: 1.0,
            target_find: true,
            multi_select: true,
        };
        scene.resize(css_size.0, css_size.1, device_pixel_ratio);
        scene
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Track a new displayed box for the capture surface
    pub fn resize(&mut self, css_width: f64, css_height: f64, device_pixel_ratio: f64) {
        self.css_size = (css_width.max(1.0), css_height.max(1.0));
        self.device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        debug!(
            "Overlay resized to {}x{} css @ {}x",
            self.css_size.0, self.css_size.1, self.device_pixel_ratio
        );
    }

    pub fn css_size(&self) -> (f64, f64) {
        self.css_size
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Internal raster size in device pixels
    pub fn raster_size(&self) -> (u32, u32) {
        let w = (self.css_size.0 * self.device_pixel_ratio).round().max(1.0);
        let h = (self.css_size.1 * self.device_pixel_ratio).round().max(1.0);
        (w as u32, h as u32)
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    /// Stickers back to front
    pub fn stickers(&self) -> &[StickerObject] {
        &self.stickers
    }

    /// Sticker ids back to front
    pub fn order(&self) -> Vec<StickerId> {
        self.stickers.iter().map(|s| s.id()).collect()
    }

    pub fn get(&self, id: StickerId) -> Option<&StickerObject> {
        self.stickers.iter().find(|s| s.id() == id)
    }

    fn position(&self, id: StickerId) -> Result<usize> {
        self.stickers
            .iter()
            .position(|s| s.id() == id)
            .ok_or(PhotoboothError::StickerNotFound { id: id.0 })
    }

    fn get_mut(&mut self, id: StickerId) -> Result<&mut StickerObject> {
        let index = self.position(id)?;
        Ok(&mut self.stickers[index])
    }

    /// Place `image` at the overlay center, sized to a fraction of the
    /// shorter side, on top of everything else and selected.
    pub fn add_sticker(&mut self, image: Arc<RgbaImage>) -> StickerId {
        let id = StickerId(self.next_id);
        self.next_id += 1;

        let (w, h) = self.css_size;
        let target = w.min(h) * self.config.default_size_fraction;
        let base_scale = target / image.width().max(1) as f64;
        let center = Point::new(w / 2.0, h / 2.0);

        self.stickers
            .push(StickerObject::new(id, image, center, base_scale));
        self.selected = Some(id);

        info!("Sticker {} added at ({:.1}, {:.1})", id, center.x, center.y);
        id
    }

    /// Topmost sticker whose bounds (plus tolerance) contain `point`
    pub fn hit_test(&self, point: Point) -> Option<StickerId> {
        self.stickers
            .iter()
            .rev()
            .find(|s| s.permissions().selectable && s.contains(point, self.config.hit_tolerance))
            .map(|s| s.id())
    }

    /// Hit test honoring the target-find switch
    pub fn find_target(&self, point: Point) -> Option<StickerId> {
        if self.target_find {
            self.hit_test(point)
        } else {
            None
        }
    }

    pub fn set_target_find(&mut self, enabled: bool) {
        self.target_find = enabled;
    }

    pub fn target_find_enabled(&self) -> bool {
        self.target_find
    }

    pub fn set_multi_select(&mut self, enabled: bool) {
        self.multi_select = enabled;
    }

    pub fn multi_select_enabled(&self) -> bool {
        self.multi_select
    }

    /// Make `id` the only selected sticker
    pub fn select(&mut self, id: StickerId) -> Result<()> {
        self.position(id)?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<StickerId> {
        self.selected
    }

    /// Apply a gesture transform. Returns false when the sticker refuses it.
    pub fn transform_by_gesture(&mut self, id: StickerId, transform: StickerTransform) -> Result<bool> {
        let (min, max) = (self.config.min_scale, self.config.max_scale);
        let sticker = self.get_mut(id)?;
        let applied = match transform {
            StickerTransform::Translate { dx, dy } => sticker.translate(dx, dy),
            StickerTransform::ScaleRotate { scale, angle } => {
                let perms = sticker.permissions();
                if perms.scalable && perms.rotatable {
                    sticker.set_scale(scale, min, max) && sticker.set_angle(angle)
                } else {
                    false
                }
            }
        };
        Ok(applied)
    }

    /// Move to the end of the order (topmost)
    pub fn bring_to_front(&mut self, id: StickerId) -> Result<()> {
        let index = self.position(id)?;
        let sticker = self.stickers.remove(index);
        self.stickers.push(sticker);
        debug!("Sticker {} brought to front", id);
        Ok(())
    }

    /// Move to the start of the order (bottommost)
    pub fn send_to_back(&mut self, id: StickerId) -> Result<()> {
        let index = self.position(id)?;
        let sticker = self.stickers.remove(index);
        self.stickers.insert(0, sticker);
        debug!("Sticker {} sent to back", id);
        Ok(())
    }

    pub fn remove(&mut self, id: StickerId) -> Result<StickerObject> {
        let index = self.position(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        info!("Sticker {} removed", id);
        Ok(self.stickers.remove(index))
    }

    /// Flip the lock and return the new locked state
    pub fn toggle_lock(&mut self, id: StickerId) -> Result<bool> {
        let opacity = self.config.locked_opacity;
        let locked = self.get_mut(id)?.toggle_lock(opacity);
        info!("Sticker {} {}", id, if locked { "locked" } else { "unlocked" });
        Ok(locked)
    }

    pub fn freeze(&mut self, id: StickerId) -> Result<bool> {
        Ok(self.get_mut(id)?.freeze())
    }

    /// Unfreeze if the sticker still exists and is frozen
    pub fn unfreeze(&mut self, id: StickerId) -> bool {
        self.get_mut(id).map(|s| s.unfreeze()).unwrap_or(false)
    }

    /// Render with selection decoration
    pub fn render(&self) -> RgbaImage {
        render::render_scene(self, true)
    }

    /// Drop the selection and render once without decoration
    pub fn flatten(&mut self) -> RgbaImage {
        self.deselect();
        render::render_scene(self, false)
    }
}
