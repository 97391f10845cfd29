// ── Core error types ──
//
// Every failure a refresh cycle can hit collapses into one of three
// variants. The controller treats them identically: count, log, show a
// placeholder row, keep polling.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Refresh cycle failures ───────────────────────────────────────
    #[error("Record store unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("Render failed: {reason}")]
    RenderFailure { reason: String },

    #[error("Load timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Invalid refresh policy: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn data_unavailable(reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            reason: reason.into(),
        }
    }

    pub fn render_failure(reason: impl Into<String>) -> Self {
        Self::RenderFailure {
            reason: reason.into(),
        }
    }

    /// Short uppercase text for the inline placeholder row.
    pub fn placeholder_text(&self) -> String {
        match self {
            Self::DataUnavailable { .. } => "RECORDS UNAVAILABLE".into(),
            Self::RenderFailure { .. } => "DISPLAY FAULT".into(),
            Self::Timeout { .. } => "LINK TIMEOUT".into(),
            Self::Config { .. } => "CONFIGURATION FAULT".into(),
        }
    }
}
