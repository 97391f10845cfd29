// ── Record types ──
//
// RawRecord is what the host store hands over; RecordEntry is the
// trimmed, labelled row the Last Entries panel actually shows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label used when a record has neither a reference nor a name.
pub const UNNAMED_LABEL: &str = "UNNAMED RECORD";

// ── RecordId ────────────────────────────────────────────────────────

/// Opaque record identifier as issued by the host store.
///
/// Identifiers usually embed a sequence number (`actor-123`), which is
/// what recency ordering keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── RawRecord ───────────────────────────────────────────────────────

/// A character record as read from the host data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub id: RecordId,
    /// Generic display name, used when no reference is set.
    #[serde(default)]
    pub name: String,
    /// Reference code / surname.
    #[serde(default, alias = "surname")]
    pub reference: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
}

impl RawRecord {
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            reference: None,
            first_name: None,
            middle_name: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_given_names(
        mut self,
        first: impl Into<String>,
        middle: Option<impl Into<String>>,
    ) -> Self {
        self.first_name = Some(first.into());
        self.middle_name = middle.map(Into::into);
        self
    }

    /// Panel label: `REFERENCE - FIRST MIDDLE` when a reference is set,
    /// otherwise the generic name.
    pub fn display_label(&self) -> String {
        let Some(reference) = non_blank(self.reference.as_deref()) else {
            return non_blank(Some(self.name.as_str())).unwrap_or(UNNAMED_LABEL).to_owned();
        };

        let given: Vec<&str> = [self.first_name.as_deref(), self.middle_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();

        if given.is_empty() {
            reference.to_owned()
        } else {
            format!("{reference} - {}", given.join(" "))
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// ── RecordEntry ─────────────────────────────────────────────────────

/// One row of the Last Entries panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordEntry {
    pub id: RecordId,
    pub display_label: String,
}

impl From<&RawRecord> for RecordEntry {
    fn from(record: &RawRecord) -> Self {
        Self {
            id: record.id.clone(),
            display_label: record.display_label(),
        }
    }
}
