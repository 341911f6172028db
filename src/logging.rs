//! Render/debug logging helpers.
//!
//! Events go through `tracing`; the library never installs a subscriber.

use once_cell::sync::Lazy;

use crate::config::EnvConfig;

static DEBUG_REDRAW: Lazy<bool> = Lazy::new(|| EnvConfig::from_env().debug_redraw);

/// Whether `TAPE_SURVEY_DEBUG_REDRAW=1` was set when the process first rendered.
pub fn debug_redraw_enabled() -> bool {
    *DEBUG_REDRAW
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedrawInfo {
    pub erased_rows: usize,
    pub lines: usize,
    pub bytes: usize,
    pub finalize: bool,
}

pub fn log_debug_redraw(info: &RedrawInfo) {
    if !debug_redraw_enabled() {
        return;
    }
    tracing::debug!(
        target: "tape_survey::redraw",
        erased_rows = info.erased_rows,
        lines = info.lines,
        bytes = info.bytes,
        finalize = info.finalize,
        "redraw"
    );
}
