use std::sync::{Arc, PoisonError, RwLock};

use crate::error::CoreError;
use crate::model::RawRecord;

use super::DataSource;

/// In-process record store.
///
/// Cheaply cloneable; every clone sees the same records. Availability can
/// be switched off to simulate a host store that stops answering.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Debug)]
struct MemoryState {
    records: Vec<RawRecord>,
    available: bool,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            available: true,
        }
    }
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryState {
                records,
                available: true,
            })),
        }
    }

    pub fn push(&self, record: RawRecord) {
        self.write(|s| s.records.push(record));
    }

    pub fn set_available(&self, available: bool) {
        self.write(|s| s.available = available);
    }

    fn write(&self, f: impl FnOnce(&mut MemoryState)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    fn snapshot(&self) -> Result<Vec<RawRecord>, CoreError> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if guard.available {
            Ok(guard.records.clone())
        } else {
            Err(CoreError::data_unavailable("record store offline"))
        }
    }
}

impl DataSource for MemorySource {
    async fn list_candidate_records(&self) -> Result<Vec<RawRecord>, CoreError> {
        self.snapshot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_records() {
        let source = MemorySource::default();
        let other = source.clone();
        other.push(RawRecord::new("actor-1", "One"));

        let records = source.list_candidate_records().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let source = MemorySource::new(vec![RawRecord::new("actor-1", "One")]);
        source.set_available(false);

        let err = source.list_candidate_records().await.unwrap_err();
        assert!(matches!(err, CoreError::DataUnavailable { .. }));

        source.set_available(true);
        assert!(source.list_candidate_records().await.is_ok());
    }
}
