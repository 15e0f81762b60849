//! Text helpers (ANSI parsing, width calculations, grapheme/column layout).
//!
//! These helpers are pure (string in/string out) and live under `core` so the editor and the
//! hit-testers can share them without importing anything from the render layer.

pub mod ansi;
pub mod utils;
pub mod width;
