//! Rendering targets.

pub mod screen_buffer;

pub use screen_buffer::{Cell, ScreenBuffer};
