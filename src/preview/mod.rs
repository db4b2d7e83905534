mod flow;
mod share;

pub use flow::{encode_png, save_file_name, PreviewFlow, PreviewSession, ShareOutcome};
pub use share::{CommandShare, ShareFile, ShareTarget, UnsupportedShare};
