//! Incremental reveal window over the anomaly result set.

use serde::{Deserialize, Serialize};

use crate::rows::Row;

/// Rows revealed per "load more" step.
pub const PAGE_SIZE: usize = 50;

/// One entry of the anomaly-score listing: the dataset row index and the
/// isolation score the service assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScore {
    pub index: u64,
    pub score: f64,
}

/// Owns the immutable flagged-row sequence and a reveal count that grows in
/// fixed pages and saturates at the sequence length. An empty set is a
/// first-class outcome ("no anomalies found"), distinct from the unfetched
/// state, which the session tracks separately.
#[derive(Debug, Default)]
pub struct AnomalyPager {
    rows: Vec<Row>,
    revealed: usize,
}

impl AnomalyPager {
    /// Installs a fresh anomaly set, seeding the reveal count to one page
    /// clamped to the sequence length.
    pub fn replace(&mut self, rows: Vec<Row>) {
        self.revealed = PAGE_SIZE.min(rows.len());
        self.rows = rows;
    }

    /// Grows the reveal window by one page. Idempotent at the ceiling: once
    /// every row is revealed, further calls change nothing.
    pub fn reveal(&mut self) -> usize {
        self.revealed = (self.revealed + PAGE_SIZE).min(self.rows.len());
        self.revealed
    }

    /// The currently revealed prefix of the anomaly set.
    pub fn visible(&self) -> &[Row] {
        &self.rows[..self.revealed]
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether more rows remain beyond the current window.
    pub fn has_more(&self) -> bool {
        self.revealed < self.rows.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
