//! One logged-in session: the refresh controller and its data bridge.
//!
//! Created on login, dropped on logout. Dropping shuts the controller
//! down, which cancels its timer and any pending watchdog.

use std::path::PathBuf;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use termlink_core::{
    CoreError, DataSource, EntryRefreshController, JsonFileSource, MemorySource, RawRecord,
    RefreshConfig, RefreshStatus, TriggerOutcome,
};

use crate::action::Action;
use crate::data_bridge::spawn_data_bridge;
use crate::renderer::PanelRenderer;

/// Everything a session needs from config and CLI.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub operator: String,
    pub title: String,
    /// JSON export to poll; the demo set is used without one.
    pub records: Option<PathBuf>,
    pub policy: RefreshConfig,
}

/// The record store a session polls.
#[derive(Debug, Clone)]
pub enum SessionSource {
    Demo(MemorySource),
    File(JsonFileSource),
}

impl DataSource for SessionSource {
    async fn list_candidate_records(&self) -> Result<Vec<RawRecord>, CoreError> {
        match self {
            Self::Demo(source) => source.list_candidate_records().await,
            Self::File(source) => source.list_candidate_records().await,
        }
    }
}

pub type PanelController = EntryRefreshController<SessionSource, PanelRenderer>;

pub struct Session {
    controller: PanelController,
    bridge: CancellationToken,
}

impl Session {
    /// Build the controller (stopped) and start forwarding its status.
    pub fn open(
        settings: &SessionSettings,
        action_tx: UnboundedSender<Action>,
    ) -> Result<Self, CoreError> {
        let source = match &settings.records {
            Some(path) => {
                let file = JsonFileSource::new(path);
                debug!(path = %file.path().display(), "polling record export");
                SessionSource::File(file)
            }
            None => SessionSource::Demo(MemorySource::new(demo_records())),
        };
        let renderer = PanelRenderer::new(action_tx.clone());
        let controller = EntryRefreshController::new(settings.policy.clone(), source, renderer)?;

        let bridge = CancellationToken::new();
        tokio::spawn(spawn_data_bridge(
            controller.subscribe(),
            action_tx,
            bridge.clone(),
        ));

        info!(operator = %settings.operator, "session opened");
        Ok(Self { controller, bridge })
    }

    /// Panel became visible: arm the timer and load right away.
    pub fn show_panel(&self) {
        self.controller.start();
        let outcome = self.controller.refresh_now();
        debug!(?outcome, "panel shown");
    }

    pub fn hide_panel(&self) {
        self.controller.stop();
    }

    pub fn refresh_now(&self) -> TriggerOutcome {
        self.controller.refresh_now()
    }

    /// Re-populate the panel only if it shows nothing.
    pub fn force_display(&self) -> TriggerOutcome {
        self.controller.force_display()
    }

    pub fn status(&self) -> RefreshStatus {
        self.controller.status()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.controller.shutdown();
        self.bridge.cancel();
        info!("session closed");
    }
}

/// Records served when no export file is configured.
pub fn demo_records() -> Vec<RawRecord> {
    vec![
        RawRecord::new("actor-9", "Courier").with_reference("HALE"),
        RawRecord::new("actor-45", "Archivist")
            .with_reference("OKAFOR")
            .with_given_names("ADA", Some("N.")),
        RawRecord::new("actor-123", "Warden")
            .with_reference("VANCE")
            .with_given_names("ELI", None::<&str>),
        RawRecord::new("actor-7", "Drifter"),
        RawRecord::new("actor-12", ""),
    ]
}
