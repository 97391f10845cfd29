// ── Renderer seam ──
//
// The controller never touches the display directly. A Renderer owns
// the visible list and everything attached to its rows.

use crate::error::CoreError;
use crate::model::RecordEntry;

/// Text of the single row shown for an empty record set.
pub const NO_ENTRIES_PLACEHOLDER: &str = "NO ENTRIES";

/// Keeps a visible list in sync with the latest refresh result.
///
/// `render` fully replaces the list with `entries`. An empty slice shows
/// exactly one [`NO_ENTRIES_PLACEHOLDER`] row, never a blank panel.
/// Rendering the same entries twice must leave the display unchanged.
/// Per-row interaction targets are rebuilt on every render; nothing
/// attached to a previous row set survives it.
///
/// `render_error` replaces the list with a single placeholder row
/// carrying `message`.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, entries: &[RecordEntry]) -> Result<(), CoreError>;

    fn render_error(&self, message: &str) -> Result<(), CoreError>;
}
