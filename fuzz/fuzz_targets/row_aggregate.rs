#![no_main]

use logtally::aggregate::{DescriptionRule, RecordAggregator, RowFilter, RowPlan};
use logtally::hash::HashMarkers;
use logtally::statistics::{finalize, SummaryMeta};
use libfuzzer_sys::fuzz_target;
use std::path::PathBuf;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let flags = data[0];
    let dimension = (flags & 0x3) as usize;
    let metadata = (flags & 0x4 == 0x4).then_some(3);
    let rule = if flags & 0x8 == 0x8 {
        DescriptionRule::WithField(((flags >> 4) & 0x3) as usize)
    } else {
        DescriptionRule::Plain
    };
    let filter = (flags & 0x40 == 0x40).then_some(RowFilter { index: 1, value: "x" });

    let text = String::from_utf8_lossy(&data[1..]);
    let markers = HashMarkers::default();
    let mut aggregator = RecordAggregator::new(RowPlan {
        delimiter: ',',
        dimension,
        filter,
        metadata,
        rule,
        markers: &markers,
    });
    aggregator.extend(text.split('\n'));
    let aggregation = aggregator.finish();
    let total = aggregation.total_records;

    let summary = finalize(
        SummaryMeta {
            name: "fuzz.csv".to_string(),
            path: PathBuf::from("fuzz.csv"),
            date: None,
        },
        aggregation,
    );

    let sum: u64 = summary.aggregates.values().map(|a| a.count).sum();
    assert_eq!(sum, total);
    assert!(summary.total_retries <= total);
});
