// ── Periodic entry refresh ──

mod controller;
mod state;

pub use controller::EntryRefreshController;
pub use state::{Cadence, Phase, RefreshStatus, Trigger, TriggerOutcome};
