//! Per-summary CSV export
//!
//! Each summary lands in `<export dir>/<YYYY-MM-DD>.csv`; summaries without a
//! date use `undated-<file stem>.csv`. When two summaries of one run share a
//! date, the later one is written to `<YYYY-MM-DD>-<file stem>.csv` instead of
//! replacing the earlier export.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::aggregate::FileSummary;
use crate::platform::create_helpful_error_message;

pub const EXPORT_HEADER: [&str; 5] = [
    "Description",
    "Percentage with retries",
    "Total count",
    "Percentage without retries",
    "Total count without retries",
];

fn stem(summary: &FileSummary) -> String {
    Path::new(&summary.name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| summary.name.clone())
}

/// File name a summary exports to when nothing else claimed it
pub fn export_file_name(summary: &FileSummary) -> String {
    match summary.date {
        Some(date) => format!("{}.csv", date),
        None => format!("undated-{}.csv", stem(summary)),
    }
}

fn format_percentage(value: f64) -> String {
    format!("{:.6}", value)
}

/// Writes one CSV file per summary into a directory
pub struct CsvExporter {
    dir: PathBuf,
    written: HashSet<PathBuf>,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: HashSet::new(),
        }
    }

    fn target_for(&self, summary: &FileSummary) -> PathBuf {
        let primary = self.dir.join(export_file_name(summary));
        if !self.written.contains(&primary) {
            return primary;
        }
        self.dir
            .join(format!("{}-{}.csv", summary.sort_date(), stem(summary)))
    }

    /// Export `summary`, returning the path written
    pub fn export(&mut self, summary: &FileSummary) -> Result<PathBuf> {
        let path = self.target_for(summary);
        let file = File::create(&path)
            .map_err(|e| anyhow::anyhow!(create_helpful_error_message(&path, &e)))?;

        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(EXPORT_HEADER)
            .with_context(|| format!("Failed to write header to '{}'", path.display()))?;

        for aggregate in summary.aggregates.values() {
            writer
                .write_record([
                    aggregate.description.clone(),
                    format_percentage(aggregate.percentage),
                    aggregate.count.to_string(),
                    format_percentage(aggregate.percentage_without_retries),
                    aggregate.count_without_retries().to_string(),
                ])
                .with_context(|| format!("Failed to write row to '{}'", path.display()))?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush '{}'", path.display()))?;

        self.written.insert(path.clone());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{DescriptionRule, RecordAggregator, RowPlan};
    use crate::hash::HashMarkers;
    use crate::statistics::{finalize, SummaryMeta};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn summary(name: &str, date: Option<NaiveDate>, rows: &[&str]) -> FileSummary {
        let markers = HashMarkers::default();
        let mut aggregator = RecordAggregator::new(RowPlan {
            delimiter: ';',
            dimension: 0,
            filter: None,
            metadata: None,
            rule: DescriptionRule::Plain,
            markers: &markers,
        });
        aggregator.extend(rows.iter().copied());
        finalize(
            SummaryMeta {
                name: name.to_string(),
                path: PathBuf::from(name),
                date,
            },
            aggregator.finish(),
        )
    }

    #[test]
    fn test_export_layout() {
        let dir = TempDir::new().unwrap();
        let mut exporter = CsvExporter::new(dir.path());
        let path = exporter
            .export(&summary(
                "a-b-25122023.csv",
                NaiveDate::from_ymd_opt(2023, 12, 25),
                &["E1", "E2, with comma", "E1"],
            ))
            .unwrap();

        assert_eq!(path, dir.path().join("2023-12-25.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Description,Percentage with retries,Total count,Percentage without retries,Total count without retries"
        );
        assert_eq!(lines[1], "E1,66.666667,2,66.666667,2");
        assert_eq!(lines[2], "\"E2, with comma\",33.333333,1,33.333333,1");
    }

    #[test]
    fn test_undated_export_name() {
        let s = summary("x-y-99999999.csv", None, &["E1"]);
        assert_eq!(export_file_name(&s), "undated-x-y-99999999.csv");
    }

    #[test]
    fn test_same_date_does_not_replace_earlier_export() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1);
        let mut exporter = CsvExporter::new(dir.path());

        let first = exporter.export(&summary("a-x-01012020.csv", date, &["E1"])).unwrap();
        let second = exporter.export(&summary("b-x-01012020.csv", date, &["E2"])).unwrap();

        assert_eq!(first, dir.path().join("2020-01-01.csv"));
        assert_eq!(second, dir.path().join("2020-01-01-b-x-01012020.csv"));
        assert!(std::fs::read_to_string(first).unwrap().contains("E1"));
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut exporter = CsvExporter::new(dir.path().join("missing"));
        let err = exporter
            .export(&summary("a-x-01012020.csv", None, &["E1"]))
            .unwrap_err();
        assert!(err.to_string().contains("Cannot create output file"));
    }
}
