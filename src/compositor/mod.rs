mod frames;

pub use frames::{draw_frame, FrameCompositor, FramePlacement};
