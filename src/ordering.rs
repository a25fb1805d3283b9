use std::cmp::Ordering;

use crate::aggregate::FileSummary;
use crate::cli::FileOrder;

/// Newest first; undated summaries sort as the zero date, i.e. last
fn by_date_desc(a: &FileSummary, b: &FileSummary) -> Ordering {
    b.sort_date().cmp(&a.sort_date())
}

/// Order summaries by embedded date, descending
///
/// The sort is stable: with `FileOrder::Cli` equal dates keep the order they
/// were collected in, with `FileOrder::Name` they are ordered by file name.
pub fn sort_summaries(summaries: &mut [FileSummary], order: &FileOrder) {
    match order {
        FileOrder::Cli => summaries.sort_by(by_date_desc),
        FileOrder::Name => {
            summaries.sort_by(|a, b| by_date_desc(a, b).then_with(|| a.name.cmp(&b.name)))
        }
    }
}
