// ── Record data sources ──
//
// Read-only seam between the refresh controller and whatever holds the
// records. Implementations must tolerate being queried every tick.

mod json_file;
mod memory;

use std::future::Future;
use std::sync::Arc;

pub use json_file::JsonFileSource;
pub use memory::MemorySource;

use crate::error::CoreError;
use crate::model::RawRecord;

/// Supplies the candidate records for the Last Entries panel.
///
/// Queries are idempotent and never mutate the backing store. A store
/// that cannot be queried reports [`CoreError::DataUnavailable`].
pub trait DataSource: Send + Sync + 'static {
    fn list_candidate_records(
        &self,
    ) -> impl Future<Output = Result<Vec<RawRecord>, CoreError>> + Send;
}

impl<T: DataSource> DataSource for Arc<T> {
    fn list_candidate_records(
        &self,
    ) -> impl Future<Output = Result<Vec<RawRecord>, CoreError>> + Send {
        (**self).list_candidate_records()
    }
}
