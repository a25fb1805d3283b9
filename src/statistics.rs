//! Percentage computation for aggregated files
//!
//! Every member of a hash group with more than one row counts as a retry,
//! including the first occurrence of the event. Both the per-description retry
//! counts and the file-wide retry total follow that rule.

use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::aggregate::{Aggregate, FileAggregation, FileSummary};

/// Identity of the file an aggregation belongs to
#[derive(Debug, Clone)]
pub struct SummaryMeta {
    pub name: String,
    pub path: PathBuf,
    pub date: Option<NaiveDate>,
}

/// `part / whole * 100`, or NaN when `whole` is zero
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return f64::NAN;
    }
    part as f64 / whole as f64 * 100.0
}

/// Turn a completed aggregation into an immutable summary
pub fn finalize(meta: SummaryMeta, aggregation: FileAggregation) -> FileSummary {
    let FileAggregation {
        counts,
        hash_groups,
        total_records,
        rows,
    } = aggregation;

    let mut retries_by_description: HashMap<&str, u64> = HashMap::new();
    let mut total_retries = 0u64;
    for members in hash_groups.retried() {
        total_retries += members.len() as u64;
        for description in members {
            *retries_by_description.entry(description.as_str()).or_insert(0) += 1;
        }
    }

    let remaining_total = total_records.saturating_sub(total_retries);

    let aggregates: IndexMap<String, Aggregate> = counts
        .iter()
        .map(|(description, &count)| {
            let retry_count = retries_by_description
                .get(description.as_str())
                .copied()
                .unwrap_or(0);
            let aggregate = Aggregate {
                description: description.clone(),
                count,
                retry_count,
                percentage: percent(count, total_records),
                percentage_without_retries: percent(
                    count.saturating_sub(retry_count),
                    remaining_total,
                ),
            };
            (description.clone(), aggregate)
        })
        .collect();

    FileSummary {
        date: meta.date,
        name: meta.name,
        path: meta.path,
        aggregates,
        total_records,
        total_retries,
        rows,
    }
}
