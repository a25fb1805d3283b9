use crate::aggregate::FileSummary;

use super::ReportFormatter;

// JSON formatter, one summary object per line
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, summary: &FileSummary) -> String {
        // Non-finite percentages serialize as null
        serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
    }
}
