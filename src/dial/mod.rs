//! Long-press action dial and the gesture routing around it.

mod action;
mod controller;
mod machine;
mod timer;

pub use action::{classify_flick, DialAction};
pub use controller::{ActionDialView, GestureController, GestureOutcome};
pub use machine::{transition, DialEffect, DialInput, DialMachine, DialState, DialThresholds, TimerId};
pub use timer::LongPressTimer;
