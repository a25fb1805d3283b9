use std::fs;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

use logtally::aggregate::{DescriptionRule, RecordAggregator, RowPlan};
use logtally::cli::FileOrder;
use logtally::config::AnalysisConfig;
use logtally::hash::HashMarkers;
use logtally::{ParallelConfig, ParallelProcessor};

fn sample_rows(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "E{},detail{},Chromecast,session hash={:x}; region=eu",
                i % 12,
                i % 5,
                i % 7919
            )
        })
        .collect()
}

fn bench_hash_extract(c: &mut Criterion) {
    let markers = HashMarkers::default();
    let line = "E408,timeout,Chromecast,session=42 hash=9f86d081884c7d65; region=eu";
    c.bench_function("hash_extract", |b| {
        b.iter(|| {
            black_box(markers.extract(black_box(line)));
        });
    });
}

fn bench_aggregate_rows(c: &mut Criterion) {
    let rows = sample_rows(10_000);
    let markers = HashMarkers::default();

    c.bench_function("aggregate_10k_rows", |b| {
        b.iter(|| {
            let mut aggregator = RecordAggregator::new(RowPlan {
                delimiter: ',',
                dimension: 0,
                filter: None,
                metadata: Some(3),
                rule: DescriptionRule::WithField(1),
                markers: &markers,
            });
            aggregator.extend(rows.iter());
            black_box(aggregator.finish());
        });
    });
}

fn bench_process_directory(c: &mut Criterion) {
    let dir = TempDir::new().expect("temp dir");
    let body = format!(
        "Error Code,Detail,Device,Meta\n{}",
        sample_rows(5_000).join("\n")
    );
    let files: Vec<_> = (1..=16)
        .map(|day| {
            let path = dir.path().join(format!("export-x-{:02}032021.csv", day));
            fs::write(&path, &body).expect("write export");
            path
        })
        .collect();

    for workers in [1, 4] {
        let processor = ParallelProcessor::new(
            ParallelConfig {
                num_workers: workers,
                file_order: FileOrder::Cli,
            },
            AnalysisConfig::default(),
        );
        c.bench_function(&format!("process_16_files_{}_workers", workers), |b| {
            b.iter(|| {
                black_box(processor.process_files(&files));
            });
        });
    }
}

criterion_group!(
    benches,
    bench_hash_extract,
    bench_aggregate_rows,
    bench_process_directory
);
criterion_main!(benches);
