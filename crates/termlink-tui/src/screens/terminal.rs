//! Terminal screen: session home with the Last Entries panel beside it.

use chrono::{DateTime, Local};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use termlink_core::{RecordEntry, RefreshStatus};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::last_entries::LastEntriesPanel;

const PANEL_WIDTH: u16 = 40;

struct OpenedRecord {
    entry: RecordEntry,
    opened_at: DateTime<Local>,
}

pub struct TerminalScreen {
    operator: String,
    title: String,
    panel: LastEntriesPanel,
    panel_visible: bool,
    opened: Option<OpenedRecord>,
    status: Option<RefreshStatus>,
}

impl TerminalScreen {
    pub fn new(operator: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            title: title.into(),
            panel: LastEntriesPanel::new(),
            panel_visible: false,
            opened: None,
            status: None,
        }
    }

    /// Forget everything from the previous session.
    fn reset(&mut self) {
        self.panel = LastEntriesPanel::new();
        self.panel_visible = false;
        self.opened = None;
        self.status = None;
    }

    fn render_main(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Plain)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = match &self.opened {
            Some(record) => vec![
                Line::styled("RECORD FILE", theme::title_style()),
                Line::from(""),
                Line::from(vec![
                    Span::styled("ID      ", theme::text()),
                    Span::styled(record.entry.id.as_str(), theme::text_bright()),
                ]),
                Line::from(vec![
                    Span::styled("SUBJECT ", theme::text()),
                    Span::styled(record.entry.display_label.as_str(), theme::text_bright()),
                ]),
                Line::from(vec![
                    Span::styled("OPENED  ", theme::text()),
                    Span::styled(
                        record.opened_at.format("%H:%M:%S").to_string(),
                        theme::text_bright(),
                    ),
                ]),
                Line::from(""),
                Line::styled("[ESC] CLOSE FILE", theme::key_hint()),
            ],
            None => vec![
                Line::styled(format!("WELCOME, {}.", self.operator), theme::text_bright()),
                Line::from(""),
                Line::styled(
                    "PRESS [E] TO MONITOR THE LAST ENTRIES FEED.",
                    theme::text(),
                ),
                Line::styled(
                    "SELECT AN ENTRY AND PRESS [ENTER] TO OPEN ITS FILE.",
                    theme::text(),
                ),
            ],
        };

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn status_line(&self) -> Line<'_> {
        let Some(status) = &self.status else {
            return Line::styled(" LINK OFFLINE", theme::key_hint());
        };

        let last_sync = status.last_success.map_or_else(
            || "--:--:--".to_owned(),
            |at| at.with_timezone(&Local).format("%H:%M:%S").to_string(),
        );
        let errors_style = if status.consecutive_errors > 0 {
            theme::fault()
        } else {
            theme::text()
        };

        let phase: &'static str = status.phase.into();

        Line::from(vec![
            Span::styled(" LINK ", theme::text()),
            Span::styled(phase, theme::text_bright()),
            Span::styled(" │ CADENCE ", theme::text()),
            Span::styled(
                humantime::format_duration(status.period).to_string(),
                theme::text_bright(),
            ),
            Span::styled(" │ ERR ", theme::text()),
            Span::styled(status.consecutive_errors.to_string(), errors_style),
            Span::styled(" │ LAST SYNC ", theme::text()),
            Span::styled(last_sync, theme::text_bright()),
        ])
    }
}

impl Component for TerminalScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc if self.opened.is_some() => Ok(Some(Action::CloseRecord)),
            KeyCode::Char('e') => Ok(Some(Action::TogglePanel)),
            KeyCode::Char('r') => Ok(Some(Action::RefreshNow)),
            KeyCode::Char('L') => Ok(Some(Action::Logout)),
            _ if self.panel_visible => self.panel.handle_key_event(key),
            _ => Ok(None),
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.panel_visible {
            return self.panel.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::PanelVisibility(visible) => self.panel_visible = *visible,
            Action::OpenRecord(id) => {
                self.opened = self.panel.entry(id).cloned().map(|entry| OpenedRecord {
                    entry,
                    opened_at: Local::now(),
                });
            }
            Action::CloseRecord => self.opened = None,
            Action::Logout => self.reset(),
            Action::RefreshStatus(status) => {
                self.status = Some(status.clone());
                self.panel.update(action)?;
            }
            Action::EntriesRendered(_) | Action::EntriesFailed(_) => {
                self.panel.update(action)?;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [header, body, status, hints] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let banner = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} ", self.title), theme::title_style()),
            Span::styled(format!("── OPERATOR {}", self.operator), theme::text()),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(theme::border_focused()),
        );
        frame.render_widget(banner, header);

        if self.panel_visible {
            let [main, panel] =
                Layout::horizontal([Constraint::Min(20), Constraint::Length(PANEL_WIDTH)])
                    .areas(body);
            self.render_main(frame, main);
            self.panel.render(frame, panel);
        } else {
            self.render_main(frame, body);
        }

        frame.render_widget(Paragraph::new(self.status_line()), status);

        let hint_line = Line::from(vec![
            Span::styled(" e ", theme::key_hint_key()),
            Span::styled("entries  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh  ", theme::key_hint()),
            Span::styled("j/k ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("⏎ ", theme::key_hint_key()),
            Span::styled("open  ", theme::key_hint()),
            Span::styled("L ", theme::key_hint_key()),
            Span::styled("logout  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hint_line), hints);
    }

    fn id(&self) -> &'static str {
        "terminal"
    }
}
