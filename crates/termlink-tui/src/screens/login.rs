//! Login gate: shown until a session is opened.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct LoginScreen {
    operator: String,
    title: String,
    /// Last login failure, cleared on the next attempt.
    error: Option<String>,
}

impl LoginScreen {
    pub fn new(operator: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            title: title.into(),
            error: None,
        }
    }
}

impl Component for LoginScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Enter => {
                self.error = None;
                Ok(Some(Action::Login))
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::LoginFailed(reason) = action {
            self.error = Some(reason.clone());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(theme::border_focused());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [_, body, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Fill(1),
        ])
        .areas(inner);

        let mut lines = vec![
            Line::styled("ACCESS RESTRICTED", theme::text_bright()),
            Line::from(""),
            Line::from(vec![
                Span::styled("OPERATOR: ", theme::text()),
                Span::styled(self.operator.as_str(), theme::text_bright()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("[ENTER] ", theme::key_hint_key()),
                Span::styled("LOG IN   ", theme::key_hint()),
                Span::styled("[Q] ", theme::key_hint_key()),
                Span::styled("QUIT", theme::key_hint()),
            ]),
        ];
        if let Some(error) = &self.error {
            lines.push(Line::from(""));
            lines.push(Line::styled(format!("!! {error}"), theme::fault()));
        }

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);
    }

    fn id(&self) -> &'static str {
        "login"
    }
}
