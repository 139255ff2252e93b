use std::collections::HashSet;
use tracing::info;

use crate::data_model::Record;
use crate::utils::prometheus_metrics::DUPLICATES_REMOVED_TOTAL;

/// Keeps the first occurrence of each exact raw text, in input order.
/// Only ever applied to the train partition, before cleaning.
pub fn deduplicate_by_text(records: Vec<Record>) -> Vec<Record> {
    let before = records.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(before);
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| seen.insert(r.text.clone()))
        .collect();
    let removed = before - kept.len();
    DUPLICATES_REMOVED_TOTAL.inc_by(removed as f64);
    info!("Removed {} duplicate texts, {} remain", removed, kept.len());
    kept
}
