//! Reusable widgets.

pub mod last_entries;
