//! Worker for a single input file
//!
//! Runs one file through `Reading → HeaderResolved → Aggregating → Finalized`.
//! Only I/O errors end in `Failed`; unresolved columns end in `Skipped`.

use std::fs;
use std::path::Path;

use crate::aggregate::{DescriptionRule, RecordAggregator, RowFilter, RowPlan};
use crate::columns::{ColumnIndices, ColumnRequest};
use crate::config::{emit_info, emit_warning, AnalysisConfig};
use crate::statistics::{finalize, SummaryMeta};
use crate::timestamp::parse_path_date;

use super::types::{FileError, FileOutcome, FileState, SkipReason, SkippedFile};

/// Tracks and reports the lifecycle of one file
struct Lifecycle<'a> {
    path: &'a Path,
    state: FileState,
}

impl<'a> Lifecycle<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            state: FileState::Pending,
        }
    }

    fn advance(&mut self, next: FileState) {
        self.state = next;
        emit_info(&format!("{}: {}", self.path.display(), next));
    }

    fn fail(&mut self, source: std::io::Error) -> FileOutcome {
        let error = FileError::io(self.path.to_path_buf(), self.state, source);
        self.state = FileState::Failed;
        FileOutcome::Failed(error)
    }

    fn skip(&mut self, reason: SkipReason) -> FileOutcome {
        emit_warning(&format!("Skipping '{}': {}", self.path.display(), reason));
        self.state = FileState::Skipped;
        FileOutcome::Skipped(SkippedFile {
            path: self.path.to_path_buf(),
            reason,
        })
    }
}

/// Analyze one file to completion
pub(crate) fn analyze_file(path: &Path, analysis: &AnalysisConfig, max_bytes: u64) -> FileOutcome {
    let mut lifecycle = Lifecycle::new(path);
    lifecycle.advance(FileState::Reading);

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return lifecycle.fail(e),
    };
    if bytes.len() as u64 > max_bytes {
        emit_warning(&format!(
            "'{}' is {} bytes, above the {} byte read ceiling; reading it in full",
            path.display(),
            bytes.len(),
            max_bytes
        ));
    }
    let content = String::from_utf8_lossy(&bytes);

    let mut lines = content.split('\n');
    let header = match lines.next() {
        Some(h) if !h.trim().is_empty() => h,
        _ => return lifecycle.skip(SkipReason::EmptyFile),
    };

    let active_filter = analysis.filter.as_ref().filter(|f| !f.value.is_empty());
    let request = ColumnRequest {
        dimension: &analysis.dimension,
        filter_key: active_filter.map(|f| f.key.as_str()),
        metadata: analysis.metadata_column.as_deref(),
    };
    let indices = ColumnIndices::resolve_line(header, analysis.delimiter, &request);

    let Some(dimension) = indices.dimension else {
        return lifecycle.skip(SkipReason::MissingColumn {
            role: "dimension",
            name: analysis.dimension.clone(),
        });
    };

    let filter = match active_filter {
        Some(config) => match indices.filter {
            Some(index) => Some(RowFilter {
                index,
                value: config.value.as_str(),
            }),
            None => {
                return lifecycle.skip(SkipReason::MissingColumn {
                    role: "filter",
                    name: config.key.clone(),
                })
            }
        },
        None => None,
    };

    if let (Some(name), None) = (&analysis.metadata_column, indices.metadata) {
        emit_warning(&format!(
            "'{}': metadata column '{}' not found, searching whole lines for hashes",
            path.display(),
            name
        ));
    }

    lifecycle.advance(FileState::HeaderResolved);

    let plan = RowPlan {
        delimiter: analysis.delimiter,
        dimension,
        filter,
        metadata: indices.metadata,
        rule: DescriptionRule::for_dimension(&analysis.dimension, analysis.suffix.as_ref()),
        markers: &analysis.markers,
    };

    lifecycle.advance(FileState::Aggregating);
    let mut aggregator = RecordAggregator::new(plan);
    aggregator.extend(lines);
    let aggregation = aggregator.finish();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let date = match parse_path_date(path) {
        Ok(date) => Some(date),
        Err(e) => {
            emit_warning(&format!("Cannot parse date from '{}': {}", name, e));
            None
        }
    };

    let summary = finalize(
        SummaryMeta {
            name,
            path: path.to_path_buf(),
            date,
        },
        aggregation,
    );
    lifecycle.advance(FileState::Finalized);

    FileOutcome::Analyzed(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            suffix: None,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_analyze_dated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x-abc123-25122023.csv");
        fs::write(
            &path,
            "\"Error Code\",Device,Meta\nE1,dev1,hash=h1;\nE1,dev2,hash=h1;\nE2,dev1,hash=h2;\n",
        )
        .unwrap();

        let FileOutcome::Analyzed(summary) = analyze_file(&path, &config(), u64::MAX) else {
            panic!("expected an analyzed file");
        };
        assert_eq!(summary.name, "x-abc123-25122023.csv");
        assert_eq!(summary.date, NaiveDate::from_ymd_opt(2023, 12, 25));
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_retries, 2);
        assert_eq!(summary.aggregate("E1").unwrap().retry_count, 2);
        assert_eq!(summary.rows.blank, 1);
    }

    #[test]
    fn test_undated_file_is_still_analyzed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x-abc123-99999999.csv");
        fs::write(&path, "Error Code\nE1\n").unwrap();

        let outcome = analyze_file(&path, &config(), u64::MAX);
        let FileOutcome::Analyzed(summary) = outcome else {
            panic!("expected an analyzed file");
        };
        assert_eq!(summary.date, None);
        assert_eq!(summary.total_records, 1);
    }

    #[test]
    fn test_missing_dimension_skips_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a-b-01012020.csv");
        fs::write(&path, "CDN,Device\nakamai,tv\n").unwrap();

        let outcome = analyze_file(&path, &config(), u64::MAX);
        assert_eq!(outcome.state(), FileState::Skipped);
    }

    #[test]
    fn test_missing_filter_column_skips_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a-b-01012020.csv");
        fs::write(&path, "Error Code\nE1\n").unwrap();

        let mut analysis = config();
        analysis.filter = Some(FilterConfig {
            key: "Device".to_string(),
            value: "Chromecast".to_string(),
        });
        let FileOutcome::Skipped(skipped) = analyze_file(&path, &analysis, u64::MAX) else {
            panic!("expected a skipped file");
        };
        assert_eq!(
            skipped.reason,
            SkipReason::MissingColumn {
                role: "filter",
                name: "Device".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_filter_value_ignores_missing_filter_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a-b-01012020.csv");
        fs::write(&path, "Error Code\nE1\n").unwrap();

        let mut analysis = config();
        analysis.filter = Some(FilterConfig {
            key: "Device".to_string(),
            value: String::new(),
        });
        let FileOutcome::Analyzed(summary) = analyze_file(&path, &analysis, u64::MAX) else {
            panic!("expected an analyzed file");
        };
        assert_eq!(summary.total_records, 1);
        assert_eq!(summary.rows.filtered, 0);
    }

    #[test]
    fn test_empty_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a-b-01012020.csv");
        fs::write(&path, "").unwrap();
        assert_eq!(
            analyze_file(&path, &config(), u64::MAX).state(),
            FileState::Skipped
        );
    }

    #[test]
    fn test_unreadable_file_fails_while_reading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-x-01012020.csv");

        let FileOutcome::Failed(error) = analyze_file(&path, &config(), u64::MAX) else {
            panic!("expected a failed file");
        };
        assert_eq!(error.state, FileState::Reading);
    }

    #[test]
    fn test_read_ceiling_is_advisory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a-b-01012020.csv");
        fs::write(&path, "Error Code\nE1\nE2\n").unwrap();

        let FileOutcome::Analyzed(summary) = analyze_file(&path, &config(), 4) else {
            panic!("expected an analyzed file");
        };
        assert_eq!(summary.total_records, 2);
    }

    #[test]
    fn test_crlf_exports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a-b-01012020.csv");
        fs::write(&path, "Error Code,Device\r\nE1,tv\r\nE1,tv\r\n").unwrap();

        let mut analysis = config();
        analysis.filter = Some(FilterConfig {
            key: "Device".to_string(),
            value: "tv".to_string(),
        });
        let FileOutcome::Analyzed(summary) = analyze_file(&path, &analysis, u64::MAX) else {
            panic!("expected an analyzed file");
        };
        assert_eq!(summary.aggregate("E1").unwrap().count, 2);
    }
}
