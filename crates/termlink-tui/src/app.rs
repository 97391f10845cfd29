//! Application core: event loop and action dispatch.

use std::collections::HashMap;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{Frame, style::Style, widgets::Block};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::session::{Session, SessionSettings};
use crate::theme;
use crate::tui::Tui;

/// Top-level application state and event loop.
pub struct App {
    settings: SessionSettings,
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Present between login and logout.
    session: Option<Session>,
    panel_visible: bool,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(settings: SessionSettings) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(&settings).into_iter().collect();

        Self {
            settings,
            active_screen: ScreenId::Login,
            screens,
            session: None,
            panel_visible: false,
            running: true,
            action_tx,
            action_rx,
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let mut events = EventReader::new(Duration::from_millis(33));
        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event → action
            let action = match event {
                Event::Key(key) => self.handle_key_event(key)?,
                Event::Mouse(mouse) => self.handle_mouse_event(mouse)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                Event::Render => Some(Action::Render),
            };
            if let Some(action) = action {
                self.action_tx.send(action)?;
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.session = None;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys first, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    /// Update app state and propagate to screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Login => self.login()?,

            Action::Logout => {
                if let Some(session) = self.session.take() {
                    info!(
                        consecutive_errors = session.status().consecutive_errors,
                        "operator logged out"
                    );
                    drop(session);
                    self.panel_visible = false;
                    self.forward(ScreenId::Terminal, action)?;
                    self.switch_screen(ScreenId::Login);
                }
            }

            Action::TogglePanel => {
                if let Some(session) = &self.session {
                    self.panel_visible = !self.panel_visible;
                    if self.panel_visible {
                        session.show_panel();
                    } else {
                        session.hide_panel();
                    }
                    self.action_tx
                        .send(Action::PanelVisibility(self.panel_visible))?;
                }
            }

            Action::RefreshNow => {
                if let (Some(session), true) = (&self.session, self.panel_visible) {
                    let outcome = session.refresh_now();
                    debug!(?outcome, "manual refresh");
                }
            }

            // Returning from a record re-checks that the panel is not
            // sitting empty. Resizes never trigger a load.
            Action::CloseRecord => {
                self.ensure_panel_populated();
                self.forward(self.active_screen, action)?;
            }

            // Data from a session that has since ended is dropped
            Action::EntriesRendered(_) | Action::EntriesFailed(_) | Action::RefreshStatus(_) => {
                if self.session.is_some() {
                    self.forward(ScreenId::Terminal, action)?;
                }
            }

            Action::PanelVisibility(_) => self.forward(ScreenId::Terminal, action)?,

            Action::Render => {}

            other => self.forward(self.active_screen, other)?,
        }

        Ok(())
    }

    fn login(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        match Session::open(&self.settings, self.action_tx.clone()) {
            Ok(session) => {
                self.session = Some(session);
                self.switch_screen(ScreenId::Terminal);
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.action_tx.send(Action::LoginFailed(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn ensure_panel_populated(&self) {
        if let (Some(session), true) = (&self.session, self.panel_visible) {
            let outcome = session.force_display();
            debug!(?outcome, "panel display check");
        }
    }

    fn switch_screen(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        let id = self.screens.get(&target).map_or("?", |s| s.id());
        debug!("switching screen: {} → {} ({id})", self.active_screen, target);
        self.active_screen = target;
    }

    fn forward(&mut self, target: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&target) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(theme::BG_DARK)), area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, area);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use termlink_core::{Phase, RefreshConfig, RefreshStatus};

    use super::*;

    fn app_with_missing_export() -> App {
        App::new(SessionSettings {
            operator: "OVERSEER".into(),
            title: "TERMLINK".into(),
            records: Some(std::env::temp_dir().join("termlink-missing-export.json")),
            policy: RefreshConfig::default(),
        })
    }

    fn status(app: &App) -> RefreshStatus {
        app.session.as_ref().unwrap().status()
    }

    /// Let the in-flight load finish.
    async fn wait_idle(app: &App) {
        for _ in 0..100 {
            if status(app).phase != Phase::Loading {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("load never settled");
    }

    #[tokio::test(start_paused = true)]
    async fn resize_does_not_reload_a_failing_store() {
        let mut app = app_with_missing_export();
        app.process_action(&Action::Login).unwrap();
        assert_eq!(app.active_screen, ScreenId::Terminal);

        app.process_action(&Action::TogglePanel).unwrap();
        wait_idle(&app).await;
        assert_eq!(status(&app).generation, 1);
        assert_eq!(status(&app).consecutive_errors, 1);

        for _ in 0..3 {
            app.process_action(&Action::Resize(120, 40)).unwrap();
        }
        assert_eq!(status(&app).generation, 1);

        app.process_action(&Action::CloseRecord).unwrap();
        assert_eq!(status(&app).generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_closes_session_and_returns_to_login() {
        let mut app = app_with_missing_export();
        app.process_action(&Action::Login).unwrap();
        app.process_action(&Action::TogglePanel).unwrap();
        assert!(app.panel_visible);

        app.process_action(&Action::Logout).unwrap();
        assert!(app.session.is_none());
        assert!(!app.panel_visible);
        assert_eq!(app.active_screen, ScreenId::Login);

        // Without a session these are ignored.
        app.process_action(&Action::RefreshNow).unwrap();
        app.process_action(&Action::TogglePanel).unwrap();
        assert!(!app.panel_visible);
    }
}
