// JobSleuth - core/history.rs
//
// Summaries over previously stored analyses: how many, per brand, and the
// state / user counts summed across them.

use crate::core::model::{Brand, CountMap};
use crate::core::persist::{CountRow, PersistenceBatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored analysis with the id assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: u64,
    pub batch: PersistenceBatch,
}

/// Selection of stored analyses. Every set field must match.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Inclusive lower bound on `analysed_at`.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `analysed_at`.
    pub until: Option<DateTime<Utc>>,
    pub brand: Option<Brand>,
    /// Compared against the analysis' primary user.
    pub user: Option<String>,
}

impl HistoryFilter {
    pub fn matches(&self, row: &StoredAnalysis) -> bool {
        let a = &row.batch.analysis;
        self.since.map_or(true, |t| a.analysed_at >= t)
            && self.until.map_or(true, |t| a.analysed_at <= t)
            && self.brand.map_or(true, |b| a.brand == b)
            && self.user.as_deref().map_or(true, |u| a.primary_user == u)
    }
}

/// Totals over the selected analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    /// Number of matching analyses.
    pub total: usize,
    /// Analyses per brand tag.
    pub by_brand: CountMap,
    /// State counts summed over matching analyses.
    pub states: CountMap,
    /// User job counts summed over matching analyses.
    pub users: CountMap,
}

pub fn summarize_history(rows: &[StoredAnalysis], filter: &HistoryFilter) -> HistorySummary {
    let mut summary = HistorySummary::default();

    for row in rows.iter().filter(|r| filter.matches(r)) {
        summary.total += 1;
        *summary
            .by_brand
            .entry(row.batch.analysis.brand.tag().to_string())
            .or_insert(0) += 1;
        add_counts(&mut summary.states, &row.batch.states);
        add_counts(&mut summary.users, &row.batch.users);
    }

    tracing::debug!(
        stored = rows.len(),
        matched = summary.total,
        "History summarised"
    );
    summary
}

fn add_counts(into: &mut CountMap, rows: &[CountRow]) {
    for row in rows {
        *into.entry(row.key.clone()).or_insert(0) += row.count;
    }
}
