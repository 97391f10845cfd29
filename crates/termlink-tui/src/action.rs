//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use termlink_core::{RecordEntry, RecordId, RefreshStatus};

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Render,
    Resize(u16, u16),

    // ── Session ───────────────────────────────────────────────────
    Login,
    LoginFailed(String),
    Logout,

    // ── Last Entries panel ────────────────────────────────────────
    TogglePanel,
    /// The app decided the panel's visibility; screens follow it.
    PanelVisibility(bool),
    RefreshNow,

    // ── Data Events (from the refresh controller) ─────────────────
    EntriesRendered(Arc<Vec<RecordEntry>>),
    EntriesFailed(String),
    RefreshStatus(RefreshStatus),

    // ── Record detail ─────────────────────────────────────────────
    OpenRecord(RecordId),
    CloseRecord,
}
