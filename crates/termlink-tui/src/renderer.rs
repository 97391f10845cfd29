//! [`Renderer`] for the Last Entries panel.
//!
//! The controller renders from its own tasks, so rows are shipped to the
//! app loop as actions and applied by
//! [`LastEntriesPanel`](crate::widgets::last_entries::LastEntriesPanel).

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use termlink_core::{CoreError, RecordEntry, Renderer};

use crate::action::Action;

pub struct PanelRenderer {
    action_tx: UnboundedSender<Action>,
}

impl PanelRenderer {
    pub fn new(action_tx: UnboundedSender<Action>) -> Self {
        Self { action_tx }
    }

    fn send(&self, action: Action) -> Result<(), CoreError> {
        self.action_tx
            .send(action)
            .map_err(|_| CoreError::render_failure("display loop has exited"))
    }
}

impl Renderer for PanelRenderer {
    fn render(&self, entries: &[RecordEntry]) -> Result<(), CoreError> {
        self.send(Action::EntriesRendered(Arc::new(entries.to_vec())))
    }

    fn render_error(&self, message: &str) -> Result<(), CoreError> {
        self.send(Action::EntriesFailed(message.to_owned()))
    }
}
