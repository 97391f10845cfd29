//! "Last Entries" panel: the newest records, one selectable row each.
//!
//! Contents only change through [`apply_entries`](LastEntriesPanel::apply_entries)
//! and [`apply_error`](LastEntriesPanel::apply_error). Applying the same
//! entries twice is a no-op, so a steady store never moves the selection.
//! Every applied render rebuilds the row → record table that Enter and
//! mouse clicks resolve against.

use std::sync::{Arc, Mutex, PoisonError};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use termlink_core::{NO_ENTRIES_PLACEHOLDER, Phase, RecordEntry, RecordId, RefreshStatus};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub const PANEL_ID: &str = "last-entries";

/// What the panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum PanelContent {
    /// Nothing rendered yet this session.
    #[default]
    Waiting,
    Entries(Arc<Vec<RecordEntry>>),
    Fault(String),
}

#[derive(Debug, Default)]
pub struct LastEntriesPanel {
    content: PanelContent,
    /// Row index → record, rebuilt on every applied render.
    targets: Vec<RecordId>,
    selected: usize,
    phase: Option<Phase>,
    /// Screen rows of the last draw, for mouse hit-testing.
    hit_rows: Mutex<Vec<Rect>>,
}

impl LastEntriesPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows. Returns `false` when `entries` matches what is
    /// already shown and nothing changed.
    pub fn apply_entries(&mut self, entries: &Arc<Vec<RecordEntry>>) -> bool {
        if let PanelContent::Entries(current) = &self.content {
            if current == entries {
                return false;
            }
        }

        self.targets = entries.iter().map(|e| e.id.clone()).collect();
        self.selected = self.selected.min(self.targets.len().saturating_sub(1));
        self.content = PanelContent::Entries(Arc::clone(entries));
        true
    }

    /// Replace the rows with a single fault line.
    pub fn apply_error(&mut self, message: &str) {
        self.targets.clear();
        self.selected = 0;
        self.content = PanelContent::Fault(message.to_owned());
    }

    pub fn set_phase(&mut self, status: &RefreshStatus) {
        self.phase = Some(status.phase);
    }

    pub fn entry(&self, id: &RecordId) -> Option<&RecordEntry> {
        match &self.content {
            PanelContent::Entries(entries) => entries.iter().find(|e| &e.id == id),
            _ => None,
        }
    }

    pub fn selected_target(&self) -> Option<&RecordId> {
        self.targets.get(self.selected)
    }

    #[cfg(test)]
    pub fn targets(&self) -> &[RecordId] {
        &self.targets
    }

    fn select_next(&mut self) {
        if !self.targets.is_empty() {
            self.selected = (self.selected + 1).min(self.targets.len() - 1);
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn rows(&self) -> Vec<Line<'_>> {
        match &self.content {
            PanelContent::Waiting => vec![Line::styled("  AWAITING LINK...", theme::placeholder())],
            PanelContent::Fault(message) => {
                vec![Line::styled(format!("  !! {message}"), theme::fault())]
            }
            PanelContent::Entries(entries) if entries.is_empty() => {
                vec![Line::styled(
                    format!("  {NO_ENTRIES_PLACEHOLDER}"),
                    theme::placeholder(),
                )]
            }
            PanelContent::Entries(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    if i == self.selected {
                        Line::from(vec![
                            Span::styled("> ", theme::row_selected()),
                            Span::styled(entry.display_label.as_str(), theme::row_selected()),
                        ])
                    } else {
                        Line::from(vec![
                            Span::raw("  "),
                            Span::styled(entry.display_label.as_str(), theme::text()),
                        ])
                    }
                })
                .collect(),
        }
    }

    fn phase_span(&self) -> Span<'static> {
        match self.phase {
            Some(Phase::Loading) => Span::styled(" SYNC ", theme::text_bright()),
            Some(Phase::Degraded) => Span::styled(" DEGRADED ", theme::warning()),
            Some(Phase::Idle) => Span::styled(" LIVE ", theme::text()),
            Some(Phase::Stopped) | None => Span::styled(" PAUSED ", theme::key_hint()),
        }
    }
}

impl Component for LastEntriesPanel {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                Ok(None)
            }
            KeyCode::Enter => Ok(self.selected_target().cloned().map(Action::OpenRecord)),
            _ => Ok(None),
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(None);
        }
        let at = Position::new(mouse.column, mouse.row);
        let hit = self
            .hit_rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .position(|row| row.contains(at));

        let Some(index) = hit else {
            return Ok(None);
        };
        let Some(id) = self.targets.get(index).cloned() else {
            return Ok(None);
        };
        self.selected = index;
        Ok(Some(Action::OpenRecord(id)))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::EntriesRendered(entries) => {
                self.apply_entries(entries);
            }
            Action::EntriesFailed(message) => self.apply_error(message),
            Action::RefreshStatus(status) => self.set_phase(status),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" LAST ENTRIES ")
            .title_style(theme::title_style())
            .title_bottom(Line::from(self.phase_span()).right_aligned())
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(theme::border_focused());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = self.rows();
        let hit_rows: Vec<Rect> = (0..self.targets.len())
            .filter_map(|i| u16::try_from(i).ok())
            .filter(|&i| i < inner.height)
            .map(|i| Rect::new(inner.x, inner.y + i, inner.width, 1))
            .collect();
        *self.hit_rows.lock().unwrap_or_else(PoisonError::into_inner) = hit_rows;

        frame.render_widget(Paragraph::new(rows), inner);
    }

    fn id(&self) -> &'static str {
        PANEL_ID
    }
}
