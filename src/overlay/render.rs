use super::scene::Scene;
use super::sticker::StickerObject;
use crate::geometry::Point;
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use tracing::{trace, warn};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Draw every sticker back to front onto a transparent raster of the scene's
/// device-pixel size. `decorate` adds the selection border and corner handles.
pub(crate) fn render_scene(scene: &Scene, decorate: bool) -> RgbaImage {
    let (width, height) = scene.raster_size();
    let dpr = scene.device_pixel_ratio();
    let mut canvas = RgbaImage::from_pixel(width, height, TRANSPARENT);
    let mut layer = RgbaImage::new(width, height);

    for sticker in scene.stickers() {
        if draw_sticker(&mut layer, sticker, dpr) {
            imageops::overlay(&mut canvas, &layer, 0, 0);
        }
    }

    if decorate {
        if let Some(sticker) = scene.selected().and_then(|id| scene.get(id)) {
            draw_selection(&mut canvas, sticker, scene, dpr);
        }
    }

    trace!("Rendered {} stickers at {}x{}", scene.len(), width, height);
    canvas
}

/// Forward affine matrix from source pixels to raster pixels. `source` is
/// the sticker image plus its transparent border, centered on the sticker.
fn sticker_matrix(sticker: &StickerObject, source: (u32, u32), dpr: f64) -> [f32; 9] {
    let (iw, ih) = (source.0 as f64, source.1 as f64);
    let s = sticker.effective_scale() * dpr;
    let (sin_a, cos_a) = sticker.angle().to_radians().sin_cos();
    let cx = sticker.center().x * dpr;
    let cy = sticker.center().y * dpr;

    let a = s * cos_a;
    let b = -s * sin_a;
    let d = s * sin_a;
    let e = s * cos_a;
    let c = cx - a * iw / 2.0 - b * ih / 2.0;
    let f = cy - d * iw / 2.0 - e * ih / 2.0;

    [
        a as f32, b as f32, c as f32, d as f32, e as f32, f as f32, 0.0, 0.0, 1.0,
    ]
}

/// Warp one sticker into `layer`. Returns false if nothing was drawn.
fn draw_sticker(layer: &mut RgbaImage, sticker: &StickerObject, dpr: f64) -> bool {
    let source = padded_source(sticker.image(), sticker.opacity());
    let Some(projection) = Projection::from_matrix(sticker_matrix(sticker, source.dimensions(), dpr))
    else {
        warn!("Sticker {} has a degenerate transform, skipped", sticker.id());
        return false;
    };

    warp_into(&source, &projection, Interpolation::Bilinear, TRANSPARENT, layer);
    true
}

/// Copy `image` inside a 1 px transparent border with alpha scaled by
/// `opacity`. Bilinear sampling needs a neighbour on both sides, so without
/// the border the last row and column of the sticker are dropped.
fn padded_source(image: &RgbaImage, opacity: f64) -> RgbaImage {
    let mut source = RgbaImage::from_pixel(image.width() + 2, image.height() + 2, TRANSPARENT);
    imageops::replace(&mut source, image, 1, 1);
    if opacity < 1.0 {
        for pixel in source.pixels_mut() {
            pixel[3] = (pixel[3] as f64 * opacity).round().clamp(0.0, 255.0) as u8;
        }
    }
    source
}

fn draw_selection(canvas: &mut RgbaImage, sticker: &StickerObject, scene: &Scene, dpr: f64) {
    let config = scene.config();
    let (r, g, b) = config.accent_color;
    let accent = Rgba([r, g, b, 255]);

    let corners: Vec<Point> = sticker
        .corners()
        .iter()
        .map(|p| Point::new(p.x * dpr, p.y * dpr))
        .collect();

    for i in 0..corners.len() {
        let from = corners[i];
        let to = corners[(i + 1) % corners.len()];
        draw_line_segment_mut(
            canvas,
            (from.x as f32, from.y as f32),
            (to.x as f32, to.y as f32),
            accent,
        );
    }

    if sticker.permissions().controls_visible {
        let radius = ((config.corner_size * dpr) / 2.0).round().max(1.0) as i32;
        for corner in &corners {
            draw_filled_circle_mut(
                canvas,
                (corner.x.round() as i32, corner.y.round() as i32),
                radius,
                accent,
            );
        }
    }
}
