//! Record model and refresh machinery behind termlink's Last Entries panel.
//!
//! - **[`EntryRefreshController`]**: Polls a [`DataSource`] on a recurring
//!   timer and hands the newest records to a [`Renderer`]. Guarantees at
//!   most one load in flight, debounces rapid re-triggers, force-completes
//!   stuck loads through a per-cycle watchdog, and drops to a slower
//!   cadence while the source keeps failing. State transitions are
//!   published through a `tokio::sync::watch` channel as
//!   [`RefreshStatus`].
//!
//! - **[`DataSource`]**: Read-only record supplier. [`MemorySource`] keeps
//!   records in process; [`JsonFileSource`] re-reads a host export on
//!   every query.
//!
//! - **[`Renderer`]**: Idempotent display sync, implemented by the host
//!   surface.
//!
//! - **Domain model** ([`model`]): [`RawRecord`] as read from the host,
//!   [`RecordEntry`] as displayed, and the id-derived recency ordering.

pub mod config;
pub mod error;
pub mod model;
pub mod refresh;
pub mod render;
pub mod source;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::RefreshConfig;
pub use error::CoreError;
pub use model::{RawRecord, RecordEntry, RecordId, recent_entries};
pub use refresh::{Cadence, EntryRefreshController, Phase, RefreshStatus, TriggerOutcome};
pub use render::{NO_ENTRIES_PLACEHOLDER, Renderer};
pub use source::{DataSource, JsonFileSource, MemorySource};
