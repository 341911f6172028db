//! Core interfaces and types.

pub mod answer;
pub mod duration;
pub mod keys;
pub mod line_editor;
pub mod output;
pub mod terminal;
pub mod text;
pub mod write;
