// ── Domain model ──

pub mod recency;
pub mod record;

pub use recency::{RecencyKey, recent_entries};
pub use record::{RawRecord, RecordEntry, RecordId, UNNAMED_LABEL};
