// ── Recency ordering ──
//
// Host records carry no timestamp, so "most recent" is approximated by the
// number embedded in the record identifier.

use std::cmp::Ordering;

use super::record::{RawRecord, RecordEntry, RecordId};

/// Ordering key derived from the digits of a record identifier.
///
/// Compared numerically without parsing, so identifiers of any length
/// order correctly. An identifier without digits sorts as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyKey(String);

impl RecencyKey {
    pub fn from_id(id: &RecordId) -> Self {
        let digits: String = id.as_str().chars().filter(char::is_ascii_digit).collect();
        let significant = digits.trim_start_matches('0');
        Self(significant.to_owned())
    }
}

impl Ord for RecencyKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for RecencyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pick the `limit` most recent records, newest first.
///
/// Ties keep their original relative order.
pub fn recent_entries(records: Vec<RawRecord>, limit: usize) -> Vec<RecordEntry> {
    let mut keyed: Vec<(RecencyKey, RawRecord)> = records
        .into_iter()
        .map(|r| (RecencyKey::from_id(&r.id), r))
        .collect();
    // `sort_by` is stable.
    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    keyed
        .iter()
        .take(limit)
        .map(|(_, r)| RecordEntry::from(r))
        .collect()
}
