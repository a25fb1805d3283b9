// CLI-specific types and structures
// This module contains the command-line interface definitions

use clap::Parser;

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Default,
    Json,
    None,
}

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum FileOrder {
    /// Equal dates keep completion order
    #[default]
    Cli,
    /// Equal dates are ordered by file name
    Name,
}

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "logtally")]
#[command(about = "Per-file occurrence and retry statistics for delimited log exports")]
#[command(
    long_about = "Per-file occurrence and retry statistics for delimited log exports\n\nEvery <DIR>/*.csv file is aggregated on one column. Rows that share an embedded\ncontent hash are treated as retries of the same event, and percentages are reported\nwith and without them. Summaries are printed newest first, using the DDMMYYYY date\nembedded in each file name.\n\nCOMMON EXAMPLES:\n  logtally -c \"Error Code\" --filter-key Device --filter-value Chromecast exports/\n  logtally -c CDN -F json --jobs 8 .\n  logtally -c \"Error Code\" --export-dir reports/ --sink records.jsonl exports/"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Directory holding the exports (current directory if omitted)
    pub dir: Option<String>,

    /// Input file extension
    #[arg(short = 'x', long = "ext", default_value = "csv", help_heading = "Input Options")]
    pub extension: String,

    /// Field delimiter of the exports
    #[arg(long = "delimiter", default_value_t = ',', help_heading = "Input Options")]
    pub delimiter: char,

    /// Legacy read ceiling in bytes; larger files are still read in full, with a warning
    #[arg(
        short = 'm',
        long = "max-bytes",
        default_value_t = 800_000_000,
        help_heading = "Input Options"
    )]
    pub max_bytes: u64,

    /// Ordering of summaries that share the same date
    #[arg(
        long = "file-order",
        value_enum,
        default_value = "cli",
        help_heading = "Input Options"
    )]
    pub file_order: FileOrder,

    /// Column / dimension to aggregate on
    #[arg(
        short = 'c',
        long = "column",
        default_value = "Error Code",
        help_heading = "Aggregation Options"
    )]
    pub column: String,

    /// Column used to restrict which rows are counted
    #[arg(long = "filter-key", help_heading = "Aggregation Options")]
    pub filter_key: Option<String>,

    /// Value the filter column must hold
    #[arg(long = "filter-value", help_heading = "Aggregation Options")]
    pub filter_value: Option<String>,

    /// Column searched for the embedded hash instead of the whole line
    #[arg(long = "metadata-column", help_heading = "Aggregation Options")]
    pub metadata_column: Option<String>,

    /// Dimension whose descriptions get an adjacent field appended
    #[arg(
        long = "suffix-dimension",
        default_value = "Error Code",
        conflicts_with = "no_suffix",
        help_heading = "Aggregation Options"
    )]
    pub suffix_dimension: String,

    /// Index of the field appended to the description
    #[arg(
        long = "suffix-field",
        default_value_t = 1,
        conflicts_with = "no_suffix",
        help_heading = "Aggregation Options"
    )]
    pub suffix_field: usize,

    /// Always use the plain column value as description
    #[arg(long = "no-suffix", help_heading = "Aggregation Options")]
    pub no_suffix: bool,

    /// Marker preceding the embedded hash
    #[arg(long = "hash-start", default_value = "hash=", help_heading = "Retry Detection")]
    pub hash_start: String,

    /// Marker following the embedded hash
    #[arg(long = "hash-end", default_value = ";", help_heading = "Retry Detection")]
    pub hash_end: String,

    /// Characters trimmed on each side of the hash region
    #[arg(long = "hash-trim", default_value_t = 0, help_heading = "Retry Detection")]
    pub hash_trim: usize,

    /// Output format for summaries
    #[arg(
        short = 'F',
        long = "output-format",
        value_enum,
        default_value = "default",
        help_heading = "Output Options"
    )]
    pub output_format: OutputFormat,

    /// Write one CSV report per summary into this directory
    #[arg(short = 'e', long = "export-dir", help_heading = "Output Options")]
    pub export_dir: Option<String>,

    /// Index every aggregate into a JSON-lines file
    #[arg(long = "sink", help_heading = "Output Options")]
    pub sink: Option<String>,

    /// Maximum number of files analyzed at once (0 = number of CPUs)
    #[arg(short = 'j', long = "jobs", default_value_t = 4, help_heading = "Performance Options")]
    pub jobs: usize,

    /// Print run statistics to stderr
    #[arg(short = 's', long = "stats", help_heading = "Display Options")]
    pub stats: bool,

    /// Report every file's lifecycle on stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Display Options")]
    pub verbose: bool,

    /// Suppress warnings
    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help_heading = "Display Options"
    )]
    pub quiet: bool,

    /// Colorize the console report
    #[arg(
        long = "color",
        value_enum,
        default_value = "auto",
        help_heading = "Display Options"
    )]
    pub color: ColorMode,

    /// Plain `logtally:` prefixes instead of emoji on stderr
    #[arg(long = "no-emoji", help_heading = "Display Options")]
    pub no_emoji: bool,

    /// Expand a named alias from the configuration file
    #[arg(short = 'a', long = "alias", help_heading = "Configuration Options")]
    pub alias: Vec<String>,

    /// Read configuration from this file instead of the default locations
    #[arg(long = "config-file", help_heading = "Configuration Options")]
    pub config_file: Option<String>,

    /// Ignore configuration files
    #[arg(long = "ignore-config", help_heading = "Configuration Options")]
    pub ignore_config: bool,

    /// Show configuration file locations and active defaults, then exit
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,
}
