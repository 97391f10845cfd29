//! Phosphor palette and semantic styling for the terminal.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const PHOSPHOR: Color = Color::Rgb(26, 255, 128); // #1aff80
pub const PHOSPHOR_DIM: Color = Color::Rgb(18, 150, 80); // #129650
pub const PHOSPHOR_FAINT: Color = Color::Rgb(10, 80, 44); // #0a502c
pub const AMBER: Color = Color::Rgb(255, 182, 66); // #ffb642
pub const ALERT_RED: Color = Color::Rgb(255, 85, 85); // #ff5555
pub const BG_DARK: Color = Color::Rgb(4, 16, 8); // #041008
pub const BG_HIGHLIGHT: Color = Color::Rgb(14, 48, 26); // #0e301a

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(PHOSPHOR).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PHOSPHOR)
}

pub fn border_default() -> Style {
    Style::default().fg(PHOSPHOR_FAINT)
}

pub fn text() -> Style {
    Style::default().fg(PHOSPHOR_DIM)
}

pub fn text_bright() -> Style {
    Style::default().fg(PHOSPHOR)
}

/// Selected panel row.
pub fn row_selected() -> Style {
    Style::default()
        .fg(PHOSPHOR)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Placeholder rows (no entries, loading).
pub fn placeholder() -> Style {
    Style::default()
        .fg(PHOSPHOR_FAINT)
        .add_modifier(Modifier::ITALIC)
}

pub fn fault() -> Style {
    Style::default().fg(ALERT_RED).add_modifier(Modifier::BOLD)
}

pub fn warning() -> Style {
    Style::default().fg(AMBER)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn key_hint() -> Style {
    Style::default().fg(PHOSPHOR_FAINT)
}
