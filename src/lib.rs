// Core library for logtally: per-file occurrence and retry statistics

pub mod aggregate;
pub mod cli;
pub mod colors;
pub mod columns;
pub mod config;
pub mod config_file;
pub mod discovery;
pub mod formatters;
pub mod hash;
pub mod ordering;
pub mod parallel;
pub mod platform;
pub mod sink;
pub mod statistics;
pub mod stats;
pub mod timestamp;
pub mod tty;

pub use aggregate::{Aggregate, FileSummary};
pub use cli::Cli;
pub use config::AnalyzerConfig;
pub use parallel::{AnalysisReport, ParallelConfig, ParallelProcessor};

use anyhow::Result;

/// Discover the input files of `config` and analyze them concurrently
pub fn run_analysis(config: &AnalyzerConfig) -> Result<AnalysisReport> {
    let files = discovery::discover_files(&config.input.dir, &config.input.extension)?;
    if files.is_empty() {
        config::emit_warning(&format!(
            "No input files match '{}'",
            discovery::input_pattern(&config.input.dir, &config.input.extension)
        ));
    }

    let processor = ParallelProcessor::new(
        ParallelConfig {
            num_workers: config.effective_jobs(),
            file_order: config.input.file_order.clone(),
        },
        config.analysis.clone(),
    )
    .with_read_ceiling(config.input.max_bytes);

    Ok(processor.process_files(&files))
}
