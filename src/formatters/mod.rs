mod csv;
mod default;
mod json;

pub use csv::{export_file_name, CsvExporter, EXPORT_HEADER};
pub use default::DefaultFormatter;
pub use json::JsonFormatter;

use crate::aggregate::FileSummary;
use crate::cli::OutputFormat;

/// Renders one finalized summary for stdout
pub trait ReportFormatter {
    fn format(&self, summary: &FileSummary) -> String;
}

/// Build the formatter for `format`; `None` means nothing is printed
pub fn create_formatter(format: &OutputFormat, use_colors: bool) -> Option<Box<dyn ReportFormatter>> {
    match format {
        OutputFormat::Default => Some(Box::new(DefaultFormatter::new(
            use_colors,
            crate::tty::report_width(),
        ))),
        OutputFormat::Json => Some(Box::new(JsonFormatter::new())),
        OutputFormat::None => None,
    }
}
