//! Main parallel processor
//!
//! Admits one worker thread per discovered file through the admission gate,
//! collects outcomes in completion order and orders the summaries once every
//! worker has been joined.

use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use crate::aggregate::FileSummary;
use crate::config::{emit_error, emit_info, AnalysisConfig};
use crate::ordering::sort_summaries;
use crate::platform::SignalHandler;
use crate::stats::RunStats;

use super::gate::AdmissionGate;
use super::types::{FileError, FileErrorKind, FileOutcome, FileState, ParallelConfig, SkippedFile};
use super::worker::analyze_file;

/// Everything a run produced, with summaries newest first
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub summaries: Vec<FileSummary>,
    pub skipped: Vec<SkippedFile>,
    pub failures: Vec<FileError>,
    pub stats: RunStats,
    /// A termination signal stopped admission before every file was started
    pub interrupted: bool,
}

impl AnalysisReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Bounded-concurrency analyzer over a set of files
pub struct ParallelProcessor {
    config: ParallelConfig,
    analysis: AnalysisConfig,
    max_bytes: u64,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig, analysis: AnalysisConfig) -> Self {
        Self {
            config,
            analysis,
            max_bytes: u64::MAX,
        }
    }

    pub fn with_read_ceiling(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Analyze every file, isolating failures to the file that caused them
    pub fn process_files(&self, files: &[PathBuf]) -> AnalysisReport {
        let started = Instant::now();
        let gate = AdmissionGate::new(self.config.num_workers);
        let (outcome_sender, outcome_receiver) = unbounded::<FileOutcome>();
        let mut interrupted = false;
        let mut panicked = Vec::new();

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(files.len());

            for path in files {
                if SignalHandler::should_terminate() {
                    interrupted = true;
                    break;
                }

                // Blocks while every slot is taken
                let permit = gate.acquire();
                if SignalHandler::should_terminate() {
                    interrupted = true;
                    break;
                }

                let sender = outcome_sender.clone();
                let analysis = &self.analysis;
                let max_bytes = self.max_bytes;
                let handle = scope.spawn(move || {
                    let _permit = permit;
                    let outcome = analyze_file(path, analysis, max_bytes);
                    let _ = sender.send(outcome);
                });
                handles.push((path, handle));
            }

            for (path, handle) in handles {
                if let Err(payload) = handle.join() {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    emit_error(&format!(
                        "Worker thread panicked on '{}', continuing with remaining files",
                        path.display()
                    ));
                    panicked.push(FileError {
                        path: path.clone(),
                        state: FileState::Aggregating,
                        kind: FileErrorKind::Panicked(message),
                    });
                }
            }
        });
        drop(outcome_sender);

        let mut report = AnalysisReport {
            interrupted,
            ..AnalysisReport::default()
        };
        report.stats.files_discovered = files.len();

        // Completion order
        for outcome in outcome_receiver.iter() {
            match outcome {
                FileOutcome::Analyzed(summary) => {
                    report.stats.add_summary(&summary);
                    report.summaries.push(summary);
                }
                FileOutcome::Skipped(skipped) => {
                    report.stats.files_skipped += 1;
                    report.skipped.push(skipped);
                }
                FileOutcome::Failed(error) => {
                    emit_error(&error.to_string());
                    report.stats.files_failed += 1;
                    report.failures.push(error);
                }
            }
        }
        report.stats.files_failed += panicked.len();
        report.failures.extend(panicked);

        sort_summaries(&mut report.summaries, &self.config.file_order);

        report.stats.peak_concurrency = gate.peak();
        report.stats.processing_time = started.elapsed();
        emit_info(&format!(
            "{} of {} files analyzed with at most {} in flight",
            report.summaries.len(),
            files.len(),
            gate.peak()
        ));

        report
    }
}
