mod booth;
mod capture;
mod interaction;
mod runtime;
mod sheet;
mod shutdown;
mod startup;
mod types;

#[cfg(test)]
mod tests;

pub use booth::{PhotoBooth, PhotoBoothBuilder};
pub use sheet::StickerSheet;
pub use types::{ControlState, ModalMessage, ShutdownReason};
