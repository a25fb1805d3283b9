use crate::aggregate::{Aggregate, FileSummary};
use crate::colors::ColorScheme;

use super::ReportFormatter;

/// Column at which the numeric part of a report line starts
const DESCRIPTION_COLUMN: usize = 45;
const RULE_WIDTH: usize = 67;

// Console report: one block per file, one line per description
pub struct DefaultFormatter {
    colors: ColorScheme,
    column: usize,
    rule_width: usize,
}

impl DefaultFormatter {
    pub fn new(use_colors: bool, terminal_width: usize) -> Self {
        Self {
            colors: ColorScheme::new(use_colors),
            // Narrow terminals still need room for the numbers
            column: DESCRIPTION_COLUMN.min(terminal_width.saturating_sub(30).max(10)),
            rule_width: RULE_WIDTH.min(terminal_width.max(1)),
        }
    }

    fn format_label(&self, label: &str, value: &str, output: &mut String) {
        let padded = format!("{:<width$}", label, width = self.column);
        output.push_str(&self.colors.paint(self.colors.label, &padded));
        output.push(' ');
        output.push_str(value);
        output.push('\n');
    }

    fn format_aggregate(&self, aggregate: &Aggregate, output: &mut String) {
        let description = &aggregate.description;
        output.push_str(&self.colors.paint(self.colors.description, description));

        let width = description.chars().count();
        if width < self.column {
            output.push_str(&" ".repeat(self.column - width));
        } else {
            output.push('\n');
            output.push_str(&" ".repeat(self.column));
        }

        output.push_str(&self.colors.paint(
            self.colors.percentage,
            &format!("{:.3}%", aggregate.percentage),
        ));
        output.push_str("   ");
        output.push_str(&self.colors.paint(self.colors.count, &aggregate.count.to_string()));
        output.push_str("   ");
        output.push_str(&self.colors.paint(
            self.colors.percentage,
            &format!("{:.3}%", aggregate.percentage_without_retries),
        ));
        output.push_str("   ");
        output.push_str(&self.colors.paint(
            self.colors.count,
            &aggregate.count_without_retries().to_string(),
        ));
        output.push('\n');
    }
}

impl ReportFormatter for DefaultFormatter {
    fn format(&self, summary: &FileSummary) -> String {
        let mut output = String::with_capacity(128 + summary.aggregates.len() * 80);
        output.push('\n');
        output.push_str(&"-".repeat(self.rule_width));
        output.push('\n');

        let date = match summary.date {
            Some(date) => date.to_string(),
            None => self.colors.paint(self.colors.undated, "undated"),
        };
        self.format_label("DATE:", &date, &mut output);
        self.format_label("CSV:", &summary.name, &mut output);

        for aggregate in summary.aggregates.values() {
            self.format_aggregate(aggregate, &mut output);
        }

        output
    }
}
