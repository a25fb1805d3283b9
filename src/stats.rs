use serde::Serialize;
use std::time::Duration;

use crate::aggregate::FileSummary;

/// Statistics collected during one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub files_discovered: usize,
    pub files_analyzed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub rows_read: u64,
    pub rows_counted: u64,
    pub rows_filtered: u64,
    pub rows_malformed: u64,
    pub retried_rows: u64,
    pub peak_concurrency: usize,
    #[serde(skip)]
    pub processing_time: Duration,
}

impl RunStats {
    /// Merge the counters of one finalized summary
    pub fn add_summary(&mut self, summary: &FileSummary) {
        self.files_analyzed += 1;
        self.rows_read += summary.rows.read;
        self.rows_counted += summary.total_records;
        self.rows_filtered += summary.rows.filtered;
        self.rows_malformed += summary.rows.malformed;
        self.retried_rows += summary.total_retries;
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Files: {} discovered, {} analyzed",
            self.files_discovered, self.files_analyzed
        );

        if self.files_skipped > 0 {
            output.push_str(&format!(", {} skipped", self.files_skipped));
        }

        if self.files_failed > 0 {
            output.push_str(&format!(", {} failed", self.files_failed));
        }

        output.push_str(&format!(
            "; Rows: {} read, {} counted, {} filtered",
            self.rows_read, self.rows_counted, self.rows_filtered
        ));

        if self.rows_malformed > 0 {
            output.push_str(&format!(", {} malformed", self.rows_malformed));
        }

        output.push_str(&format!("; Retried rows: {}", self.retried_rows));

        let processing_time_ms = self.processing_time.as_millis();
        if processing_time_ms > 0 {
            output.push_str(&format!(
                "; Time: {}ms, {} concurrent at peak",
                processing_time_ms, self.peak_concurrency
            ));
        }

        output
    }
}
