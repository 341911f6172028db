//! Text helpers (ANSI parsing, styling, width calculations).
//!
//! These helpers are pure (string in/string out) and live under `core` so prompts can depend on
//! them without importing anything from the render layer.

pub mod ansi;
pub mod width;
