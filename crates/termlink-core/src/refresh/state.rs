// ── Refresh state machine types ──
//
// RefreshState is private to the controller and only ever touched under
// its mutex. RefreshStatus is the read-only projection published to
// observers after every transition.

use std::time::Duration;

use chrono::{DateTime, Utc};
use strum::{Display, IntoStaticStr};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::RefreshConfig;

/// Which of the two timer periods is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Cadence {
    #[default]
    Normal,
    Degraded,
}

/// Observable controller phase.
///
/// `Loading` wins over everything else. A stopped controller reports
/// `Stopped` whatever its cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Phase {
    /// Timer not armed and nothing in flight.
    #[default]
    Stopped,
    Idle,
    Loading,
    Degraded,
}

/// What asked for a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Trigger {
    Timer,
    Manual,
}

/// What a trigger did. Purely informational; none of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new load cycle began.
    Started { generation: u64 },
    /// Another cycle is still loading.
    InFlight,
    /// The last success is too recent.
    Debounced,
    /// `force_display` found entries already on screen.
    AlreadyDisplayed,
    /// The controller has been shut down.
    ShutDown,
}

/// Snapshot of the controller, published on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshStatus {
    pub phase: Phase,
    pub cadence: Cadence,
    /// Period the recurring timer fires at for the current cadence.
    pub period: Duration,
    pub consecutive_errors: u32,
    /// Entries currently shown; 0 after an empty result or an error.
    pub displayed: usize,
    /// Generation of the most recently started cycle.
    pub generation: u64,
    pub last_success: Option<DateTime<Utc>>,
}

/// The cycle currently holding the single-flight slot.
#[derive(Debug)]
pub(crate) struct Cycle {
    pub generation: u64,
    pub started_at: Instant,
    pub watchdog: CancellationToken,
}

#[derive(Debug, Default)]
pub(crate) struct RefreshState {
    /// Recurring timer armed.
    pub running: bool,
    /// Single-flight flag. Stays set from trigger until the cycle's
    /// result (or placeholder) has been rendered.
    pub is_loading: bool,
    /// Unclaimed cycle. Whoever takes it (fetch or watchdog) settles it.
    pub in_flight: Option<Cycle>,
    pub generation: u64,
    pub last_success_at: Option<Instant>,
    pub last_success_wall: Option<DateTime<Utc>>,
    pub consecutive_errors: u32,
    pub cadence: Cadence,
    pub timer: Option<CancellationToken>,
    pub displayed: usize,
}

impl RefreshState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if !self.running {
            Phase::Stopped
        } else if self.cadence == Cadence::Degraded {
            Phase::Degraded
        } else {
            Phase::Idle
        }
    }

    pub fn status(&self, config: &RefreshConfig) -> RefreshStatus {
        RefreshStatus {
            phase: self.phase(),
            cadence: self.cadence,
            period: config.period(self.cadence),
            consecutive_errors: self.consecutive_errors,
            displayed: self.displayed,
            generation: self.generation,
            last_success: self.last_success_wall,
        }
    }
}
