//! Data bridge: connects the refresh controller's status channel to TUI actions.
//!
//! Runs as a background task for the lifetime of a session, forwarding
//! every [`RefreshStatus`] transition as an [`Action`].

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use termlink_core::RefreshStatus;

use crate::action::Action;

/// Forward status snapshots until cancelled or either end goes away.
pub async fn spawn_data_bridge(
    mut status: watch::Receiver<RefreshStatus>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    // Initial snapshot so the status line is populated immediately
    let initial = status.borrow_and_update().clone();
    if action_tx.send(Action::RefreshStatus(initial)).is_err() {
        return;
    }

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = status.changed() => {
                if changed.is_err() {
                    debug!("refresh status channel closed");
                    break;
                }
                let snapshot = status.borrow_and_update().clone();
                if action_tx.send(Action::RefreshStatus(snapshot)).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge stopped");
}
