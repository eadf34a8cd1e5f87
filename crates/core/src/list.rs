//! List-screen state.
//!
//! [`PantryList`] owns everything the list view needs between renders: the
//! latest snapshot from the record store, the search query and the selected
//! category chip. Front ends mutate it through methods and call
//! [`PantryList::entries`] with the current time to get display rows.

use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::ranking::ranked_with_days;
use crate::types::{CategoryFilter, ExpiryStatus, PantryRecord, Urgency, urgency};

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    #[serde(flatten)]
    pub record: PantryRecord,
    pub days_left: i64,
    pub status: ExpiryStatus,
    pub urgency: Urgency,
}

/// State of the pantry list screen.
#[derive(Debug, Clone, Default)]
pub struct PantryList {
    snapshot: Arc<[PantryRecord]>,
    query: String,
    category: CategoryFilter,
}

impl PantryList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot. Snapshots are full replacements, never
    /// deltas.
    pub fn apply_snapshot(&mut self, snapshot: impl Into<Arc<[PantryRecord]>>) {
        self.snapshot = snapshot.into();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// All records in the latest snapshot, unfiltered.
    #[must_use]
    pub fn records(&self) -> &[PantryRecord] {
        &self.snapshot
    }

    /// Whether the snapshot itself is empty, regardless of filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Rows to display, filtered and ranked.
    #[must_use]
    pub fn entries<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<ListEntry> {
        ranked_with_days(&self.snapshot, &self.query, &self.category, now)
            .into_iter()
            .map(|(days, record)| ListEntry {
                record: record.clone(),
                days_left: days,
                status: ExpiryStatus::from_days(days),
                urgency: urgency(days),
            })
            .collect()
    }
}
