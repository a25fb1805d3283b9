//! Per-file record aggregation
//!
//! Scans the data rows of one file, counts occurrences per description and
//! groups rows by their embedded content hash. Nothing here is shared between
//! files: every worker owns its own [`RecordAggregator`].

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

use crate::columns::trim_quotes;
use crate::hash::HashMarkers;

/// How the description of a row is composed from its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionRule {
    /// The dimension value as-is
    Plain,
    /// Dimension value, a space, then the value of the given field
    WithField(usize),
}

/// Selects the adjacent-field rule for one distinguished dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixRule {
    pub dimension: String,
    pub field: usize,
}

impl Default for SuffixRule {
    fn default() -> Self {
        Self {
            dimension: "Error Code".to_string(),
            field: 1,
        }
    }
}

impl DescriptionRule {
    /// Pick the rule for `dimension` given the configured suffix rule
    pub fn for_dimension(dimension: &str, suffix: Option<&SuffixRule>) -> Self {
        match suffix {
            Some(rule) if rule.dimension == dimension => DescriptionRule::WithField(rule.field),
            _ => DescriptionRule::Plain,
        }
    }

    fn required_index(&self) -> Option<usize> {
        match self {
            DescriptionRule::Plain => None,
            DescriptionRule::WithField(field) => Some(*field),
        }
    }

    fn compose(&self, fields: &[&str], dimension: usize) -> String {
        let value = trim_quotes(fields[dimension]);
        match self {
            DescriptionRule::Plain => value.to_string(),
            DescriptionRule::WithField(field) => {
                format!("{} {}", value, trim_quotes(fields[*field]))
            }
        }
    }
}

/// Row filter: only rows whose `index` field equals `value` are counted
#[derive(Debug, Clone, Copy)]
pub struct RowFilter<'a> {
    pub index: usize,
    pub value: &'a str,
}

/// Everything the aggregator needs to interpret the rows of one file
#[derive(Debug, Clone)]
pub struct RowPlan<'a> {
    pub delimiter: char,
    pub dimension: usize,
    pub filter: Option<RowFilter<'a>>,
    pub metadata: Option<usize>,
    pub rule: DescriptionRule,
    pub markers: &'a HashMarkers,
}

impl<'a> RowPlan<'a> {
    /// The filter, unless its value is empty
    pub fn active_filter(&self) -> Option<RowFilter<'a>> {
        self.filter.filter(|f| !f.value.is_empty())
    }

    /// Minimum number of fields a row needs to be counted
    pub fn min_fields(&self) -> usize {
        [
            Some(self.dimension),
            self.active_filter().map(|f| f.index),
            self.metadata,
            self.rule.required_index(),
        ]
        .into_iter()
        .flatten()
        .max()
        .map_or(0, |max| max + 1)
    }
}

/// What happened to a single data row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDisposition {
    Counted,
    Blank,
    Malformed,
    Filtered,
}

/// Row-level counters kept for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounters {
    pub read: u64,
    pub counted: u64,
    pub filtered: u64,
    pub malformed: u64,
    pub blank: u64,
}

impl RowCounters {
    fn record(&mut self, disposition: RowDisposition) {
        self.read += 1;
        match disposition {
            RowDisposition::Counted => self.counted += 1,
            RowDisposition::Blank => self.blank += 1,
            RowDisposition::Malformed => self.malformed += 1,
            RowDisposition::Filtered => self.filtered += 1,
        }
    }
}

/// Rows grouped by embedded hash, in first-appearance order
#[derive(Debug, Clone, Default)]
pub struct HashGroups {
    groups: IndexMap<String, Vec<String>>,
}

impl HashGroups {
    pub fn push(&mut self, hash: &str, description: &str) {
        self.groups
            .entry(hash.to_string())
            .or_default()
            .push(description.to_string());
    }

    pub fn get(&self, hash: &str) -> Option<&[String]> {
        self.groups.get(hash).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups with more than one member, i.e. retried events
    pub fn retried(&self) -> impl Iterator<Item = &[String]> {
        self.groups
            .values()
            .filter(|members| members.len() > 1)
            .map(Vec::as_slice)
    }
}

/// Aggregation state of one file before statistics are computed
#[derive(Debug, Clone, Default)]
pub struct FileAggregation {
    pub counts: IndexMap<String, u64>,
    pub hash_groups: HashGroups,
    pub total_records: u64,
    pub rows: RowCounters,
}

/// Accumulates descriptions and hash groups for the rows of one file
pub struct RecordAggregator<'a> {
    plan: RowPlan<'a>,
    min_fields: usize,
    state: FileAggregation,
}

impl<'a> RecordAggregator<'a> {
    pub fn new(plan: RowPlan<'a>) -> Self {
        let min_fields = plan.min_fields();
        Self {
            plan,
            min_fields,
            state: FileAggregation::default(),
        }
    }

    /// Feed one raw data row (header excluded)
    pub fn push_row(&mut self, raw: &str) -> RowDisposition {
        let disposition = self.classify_and_count(raw);
        self.state.rows.record(disposition);
        disposition
    }

    /// Feed every row of `rows` in order
    pub fn extend<I, S>(&mut self, rows: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for row in rows {
            self.push_row(row.as_ref());
        }
    }

    fn classify_and_count(&mut self, raw: &str) -> RowDisposition {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return RowDisposition::Blank;
        }

        let fields: Vec<&str> = line.split(self.plan.delimiter).collect();
        if fields.len() < self.min_fields {
            return RowDisposition::Malformed;
        }

        if let Some(filter) = self.plan.active_filter() {
            if trim_quotes(fields[filter.index]) != filter.value {
                return RowDisposition::Filtered;
            }
        }

        let description = self.plan.rule.compose(&fields, self.plan.dimension);

        let hash_source = match self.plan.metadata {
            Some(index) => fields[index],
            None => line,
        };
        let hash = self.plan.markers.extract(hash_source);
        if !hash.is_empty() {
            self.state.hash_groups.push(hash, &description);
        }

        *self.state.counts.entry(description).or_insert(0) += 1;
        self.state.total_records += 1;

        RowDisposition::Counted
    }

    pub fn finish(self) -> FileAggregation {
        self.state
    }
}

/// Finalized statistics for one description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub description: String,
    pub count: u64,
    pub retry_count: u64,
    pub percentage: f64,
    pub percentage_without_retries: f64,
}

impl Aggregate {
    /// Occurrences that are not attributed to retries
    pub fn count_without_retries(&self) -> u64 {
        self.count.saturating_sub(self.retry_count)
    }
}

/// Complete, finalized result for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub date: Option<NaiveDate>,
    pub name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub aggregates: IndexMap<String, Aggregate>,
    pub total_records: u64,
    pub total_retries: u64,
    pub rows: RowCounters,
}

impl FileSummary {
    /// Date used for ordering; undated files sort as the zero date
    pub fn sort_date(&self) -> NaiveDate {
        self.date.unwrap_or(NaiveDate::MIN)
    }

    pub fn aggregate(&self, description: &str) -> Option<&Aggregate> {
        self.aggregates.get(description)
    }
}
