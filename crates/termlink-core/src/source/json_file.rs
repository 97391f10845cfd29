use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::CoreError;
use crate::model::RawRecord;

use super::DataSource;

/// Records exported by the host as a JSON file.
///
/// The file is re-read on every query, so an export that is rewritten in
/// place shows up on the next tick. Accepts either a bare array of
/// records or an object with a `records` array.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Bare(Vec<RawRecord>),
    Wrapped { records: Vec<RawRecord> },
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, what: &str, err: impl std::fmt::Display) -> CoreError {
        CoreError::data_unavailable(format!("{what} {}: {err}", self.path.display()))
    }
}

impl DataSource for JsonFileSource {
    async fn list_candidate_records(&self) -> Result<Vec<RawRecord>, CoreError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.unavailable("cannot read", e))?;

        let parsed: RecordFile =
            serde_json::from_str(&raw).map_err(|e| self.unavailable("malformed", e))?;

        let records = match parsed {
            RecordFile::Bare(records) | RecordFile::Wrapped { records } => records,
        };
        debug!(path = %self.path.display(), count = records.len(), "read record file");
        Ok(records)
    }
}
