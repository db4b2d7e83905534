//! Sticker overlay: the scene of placed stickers, their gesture transforms
//! and rasterization over the capture surface.

mod gesture;
mod render;
mod scene;
mod sticker;
#[cfg(test)]
mod tests;

pub use gesture::{pinch_scale, DragSession, PinchSession, StickerTransform};
pub use scene::Scene;
pub use sticker::{InteractionMode, Permissions, StickerId, StickerObject};
