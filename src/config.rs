use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::aggregate::SuffixRule;
use crate::cli::{ColorMode, FileOrder, OutputFormat};
use crate::hash::HashMarkers;

/// Upper bound on `--jobs`
pub const MAX_JOBS: usize = 1000;

/// Main configuration struct for logtally
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub input: InputConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub performance: PerformanceConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Directory holding the exports; empty means the current directory
    pub dir: PathBuf,
    pub extension: String,
    pub max_bytes: u64,
    pub file_order: FileOrder,
}

/// Immutable aggregation settings shared by every file worker
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub delimiter: char,
    pub dimension: String,
    pub filter: Option<FilterConfig>,
    pub metadata_column: Option<String>,
    pub suffix: Option<SuffixRule>,
    pub markers: HashMarkers,
}

/// Column + value pair restricting which rows are counted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub key: String,
    pub value: String,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub export_dir: Option<PathBuf>,
    pub sink: Option<String>,
    pub stats: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub color: ColorMode,
    pub no_emoji: bool,
}

/// Performance configuration
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// Maximum number of files analyzed at once; 0 selects the CPU count
    pub jobs: usize,
}

impl AnalyzerConfig {
    /// Create configuration from CLI arguments, rejecting unusable combinations
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        if cli.column.trim().is_empty() {
            return Err(anyhow!("no aggregation column given (use -c/--column)"));
        }

        let filter = match (&cli.filter_key, &cli.filter_value) {
            (Some(key), Some(value)) => Some(FilterConfig {
                key: key.clone(),
                value: value.clone(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(anyhow!("--filter-key requires --filter-value")),
            (None, Some(_)) => return Err(anyhow!("--filter-value requires --filter-key")),
        };

        if cli.hash_start.is_empty() || cli.hash_end.is_empty() {
            return Err(anyhow!("--hash-start and --hash-end must not be empty"));
        }

        if cli.jobs > MAX_JOBS {
            return Err(anyhow!("--jobs must be at most {} (got {})", MAX_JOBS, cli.jobs));
        }

        if !cli.no_suffix && cli.suffix_dimension.trim().is_empty() {
            return Err(anyhow!(
                "--suffix-dimension must name a column (use --no-suffix to disable suffixes)"
            ));
        }

        let suffix = if cli.no_suffix {
            None
        } else {
            Some(SuffixRule {
                dimension: cli.suffix_dimension.clone(),
                field: cli.suffix_field,
            })
        };

        Ok(Self {
            input: InputConfig {
                dir: cli.dir.as_deref().map(PathBuf::from).unwrap_or_default(),
                extension: cli.extension.clone(),
                max_bytes: cli.max_bytes,
                file_order: cli.file_order.clone(),
            },
            analysis: AnalysisConfig {
                delimiter: cli.delimiter,
                dimension: cli.column.clone(),
                filter,
                metadata_column: cli.metadata_column.clone(),
                suffix,
                markers: HashMarkers::new(
                    cli.hash_start.clone(),
                    cli.hash_end.clone(),
                    cli.hash_trim,
                ),
            },
            output: OutputConfig {
                format: cli.output_format.clone(),
                export_dir: cli.export_dir.as_deref().map(PathBuf::from),
                sink: cli.sink.clone(),
                stats: cli.stats,
                verbose: cli.verbose,
                quiet: cli.quiet,
                color: cli.color.clone(),
                no_emoji: cli.no_emoji,
            },
            performance: PerformanceConfig { jobs: cli.jobs },
        })
    }

    /// Get effective concurrency limit with defaults
    pub fn effective_jobs(&self) -> usize {
        if self.performance.jobs == 0 {
            num_cpus::get().max(1)
        } else {
            self.performance.jobs
        }
    }

    pub fn format_error_message(&self, message: &str) -> String {
        format!("{} {}", error_prefix(self.use_emoji()), message)
    }

    pub fn format_stats_message(&self, message: &str) -> String {
        format!("{} Stats: {}", info_prefix(self.use_emoji()), message)
    }

    fn use_emoji(&self) -> bool {
        !self.output.no_emoji && crate::tty::should_use_emoji_for_stderr()
    }

    /// Publish the diagnostic settings used by worker threads
    pub fn install_diagnostics(&self) {
        VERBOSE.store(self.output.verbose, Ordering::Relaxed);
        QUIET.store(self.output.quiet, Ordering::Relaxed);
        USE_EMOJI.store(self.use_emoji(), Ordering::Relaxed);
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                dir: PathBuf::new(),
                extension: "csv".to_string(),
                max_bytes: 800_000_000,
                file_order: FileOrder::Cli,
            },
            analysis: AnalysisConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Default,
                export_dir: None,
                sink: None,
                stats: false,
                verbose: false,
                quiet: false,
                color: ColorMode::Auto,
                no_emoji: false,
            },
            performance: PerformanceConfig { jobs: 4 },
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            dimension: "Error Code".to_string(),
            filter: None,
            metadata_column: None,
            suffix: Some(SuffixRule::default()),
            markers: HashMarkers::default(),
        }
    }
}

static VERBOSE: AtomicBool = AtomicBool::new(false);
static QUIET: AtomicBool = AtomicBool::new(false);
static USE_EMOJI: AtomicBool = AtomicBool::new(false);

fn error_prefix(use_emoji: bool) -> &'static str {
    if use_emoji {
        "⚠️ "
    } else {
        "logtally:"
    }
}

fn info_prefix(use_emoji: bool) -> &'static str {
    if use_emoji {
        "🔹"
    } else {
        "logtally:"
    }
}

/// Print an error from any thread
pub fn emit_error(message: &str) {
    eprintln!("{} {}", error_prefix(USE_EMOJI.load(Ordering::Relaxed)), message);
}

/// Print a warning from any thread unless --quiet is active
pub fn emit_warning(message: &str) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }
    eprintln!("{} {}", error_prefix(USE_EMOJI.load(Ordering::Relaxed)), message);
}

/// Print a lifecycle message from any thread when --verbose is active
pub fn emit_info(message: &str) {
    if !VERBOSE.load(Ordering::Relaxed) {
        return;
    }
    eprintln!("{} {}", info_prefix(USE_EMOJI.load(Ordering::Relaxed)), message);
}
