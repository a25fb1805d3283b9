//! Record sinks for finalized aggregates
//!
//! Every aggregate of every summary is indexed as one JSON document under a
//! fresh UUID. Indexing failures never abort a run: a refused connection is
//! ignored outright, anything else is reported and the run continues.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

use crate::aggregate::{Aggregate, FileSummary};
use crate::config::emit_warning;

/// Storage backend receiving one document per aggregate
pub trait RecordSink {
    fn init(&mut self, endpoint: &str) -> Result<()>;
    fn index_record(&mut self, id: &str, document: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Document shape stored for each aggregate
#[derive(Debug, Serialize)]
pub struct SinkDocument<'a> {
    pub id: String,
    pub count: u64,
    pub total: u64,
    pub description: &'a str,
    pub percentage: f64,
    /// `None` for undated files
    pub date: Option<String>,
    pub csv_file: &'a str,
}

impl<'a> SinkDocument<'a> {
    pub fn new(id: String, summary: &'a FileSummary, aggregate: &'a Aggregate) -> Self {
        Self {
            id,
            count: aggregate.count,
            total: summary.total_records,
            description: &aggregate.description,
            percentage: aggregate.percentage,
            date: summary.date.map(|d| d.to_string()),
            csv_file: &summary.name,
        }
    }
}

/// Sink that drops every document
#[derive(Debug, Default)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn init(&mut self, _endpoint: &str) -> Result<()> {
        Ok(())
    }

    fn index_record(&mut self, _id: &str, _document: &str) -> Result<()> {
        Ok(())
    }
}

/// Open the sink for `endpoint`, or a [`NullSink`] when none is configured
pub fn open_sink(endpoint: Option<&str>) -> Result<Box<dyn RecordSink>> {
    match endpoint {
        Some(endpoint) => {
            let mut sink = JsonlSink::new();
            sink.init(endpoint)?;
            Ok(Box::new(sink))
        }
        None => Ok(Box::new(NullSink)),
    }
}

/// Appends one JSON document per line to a file
#[derive(Debug, Default)]
pub struct JsonlSink {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl JsonlSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for JsonlSink {
    fn init(&mut self, endpoint: &str) -> Result<()> {
        let path = PathBuf::from(endpoint);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| anyhow::anyhow!(crate::platform::create_helpful_error_message(&path, &e)))?;
        self.writer = Some(BufWriter::new(file));
        self.path = Some(path);
        Ok(())
    }

    fn index_record(&mut self, _id: &str, document: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::ConnectionRefused, "sink is not initialized")
        })?;
        writeln!(writer, "{}", document).with_context(|| {
            format!(
                "Failed to append to sink '{}'",
                self.path.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
            )
        })?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().context("Failed to flush sink")?;
        }
        Ok(())
    }
}

fn is_connection_refused(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::ConnectionRefused)
    }) || error.to_string().contains("connection refused")
}

/// Index every aggregate of `summary`; returns how many documents were accepted
pub fn dump_summary(sink: &mut dyn RecordSink, summary: &FileSummary) -> usize {
    let mut indexed = 0;

    for aggregate in summary.aggregates.values() {
        let id = Uuid::new_v4().to_string();
        let document = match serde_json::to_string(&SinkDocument::new(id.clone(), summary, aggregate))
        {
            Ok(document) => document,
            Err(e) => {
                emit_warning(&format!("Cannot serialize '{}': {}", aggregate.description, e));
                continue;
            }
        };

        match sink.index_record(&id, &document) {
            Ok(()) => indexed += 1,
            Err(e) if is_connection_refused(&e) => {}
            Err(e) => emit_warning(&format!("Indexing failed for '{}': {:#}", summary.name, e)),
        }
    }

    indexed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{DescriptionRule, RecordAggregator, RowPlan};
    use crate::hash::HashMarkers;
    use crate::statistics::{finalize, SummaryMeta};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn summary() -> FileSummary {
        summary_on(NaiveDate::from_ymd_opt(2016, 4, 11))
    }

    fn summary_on(date: Option<NaiveDate>) -> FileSummary {
        let markers = HashMarkers::default();
        let mut aggregator = RecordAggregator::new(RowPlan {
            delimiter: ',',
            dimension: 0,
            filter: None,
            metadata: None,
            rule: DescriptionRule::Plain,
            markers: &markers,
        });
        aggregator.extend(["E1", "E2", "E1"]);
        finalize(
            SummaryMeta {
                name: "a-b-11042016.csv".to_string(),
                path: PathBuf::from("a-b-11042016.csv"),
                date,
            },
            aggregator.finish(),
        )
    }

    #[derive(Default)]
    struct RecordingSink {
        ids: Vec<String>,
        documents: Vec<String>,
        fail_with: Option<io::ErrorKind>,
    }

    impl RecordSink for RecordingSink {
        fn init(&mut self, _endpoint: &str) -> Result<()> {
            Ok(())
        }

        fn index_record(&mut self, id: &str, document: &str) -> Result<()> {
            if let Some(kind) = self.fail_with {
                return Err(io::Error::new(kind, "backend down").into());
            }
            self.ids.push(id.to_string());
            self.documents.push(document.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_one_document_per_aggregate() {
        let mut sink = RecordingSink::default();
        assert_eq!(dump_summary(&mut sink, &summary()), 2);

        let doc: serde_json::Value = serde_json::from_str(&sink.documents[0]).unwrap();
        assert_eq!(doc["description"], "E1");
        assert_eq!(doc["count"], 2);
        assert_eq!(doc["total"], 3);
        assert_eq!(doc["date"], "2016-04-11");
        assert_eq!(doc["csv_file"], "a-b-11042016.csv");
        assert_eq!(doc["id"], sink.ids[0].as_str());
        assert_ne!(sink.ids[0], sink.ids[1]);
    }

    #[test]
    fn test_undated_summary_has_null_date() {
        let mut sink = RecordingSink::default();
        dump_summary(&mut sink, &summary_on(None));

        let doc: serde_json::Value = serde_json::from_str(&sink.documents[0]).unwrap();
        assert!(doc["date"].is_null());
    }

    #[test]
    fn test_refused_connection_is_tolerated() {
        let mut sink = RecordingSink {
            fail_with: Some(io::ErrorKind::ConnectionRefused),
            ..Default::default()
        };
        assert_eq!(dump_summary(&mut sink, &summary()), 0);
    }

    #[test]
    fn test_other_errors_are_not_fatal() {
        let mut sink = RecordingSink {
            fail_with: Some(io::ErrorKind::Other),
            ..Default::default()
        };
        assert_eq!(dump_summary(&mut sink, &summary()), 0);
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.jsonl");
        let endpoint = path.to_string_lossy().to_string();

        let mut sink = JsonlSink::new();
        sink.init(&endpoint).unwrap();
        dump_summary(&mut sink, &summary());
        sink.flush().unwrap();

        let mut sink = JsonlSink::new();
        sink.init(&endpoint).unwrap();
        dump_summary(&mut sink, &summary());
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
        for line in content.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }

    #[test]
    fn test_uninitialized_jsonl_sink_counts_as_refused() {
        let mut sink = JsonlSink::new();
        assert_eq!(dump_summary(&mut sink, &summary()), 0);
    }

    #[test]
    fn test_null_sink() {
        let mut sink = NullSink;
        sink.init("").unwrap();
        assert_eq!(dump_summary(&mut sink, &summary()), 2);
    }

    #[test]
    fn test_open_sink_defaults_to_null_sink() {
        let mut sink = open_sink(None).unwrap();
        assert_eq!(dump_summary(sink.as_mut(), &summary()), 2);

        assert!(open_sink(Some("/nonexistent-logtally-dir/records.jsonl")).is_err());
    }
}
