//! Rendering pipeline.

pub mod renderer;
pub mod templates;

pub use renderer::{RenderFrame, Renderer, View};
pub use templates::{OptionRow, TemplateData};
