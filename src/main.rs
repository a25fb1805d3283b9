use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use std::io::Write;

use logtally::cli::Cli;
use logtally::config::{emit_info, emit_warning, AnalyzerConfig};
use logtally::config_file::{ConfigFile, ConfigFlags};
use logtally::formatters::{create_formatter, CsvExporter};
use logtally::parallel::AnalysisReport;
use logtally::platform::{ExitCode, SafeStderr, SafeStdout, SignalHandler};
use logtally::sink::{dump_summary, open_sink};
use logtally::tty;

fn main() -> Result<()> {
    // Initialize signal handling early
    let _signal_handler = match SignalHandler::new() {
        Ok(handler) => handler,
        Err(e) => {
            eprintln!("Failed to initialize signal handling: {}", e);
            ExitCode::GeneralError.exit();
        }
    };

    let mut stderr = SafeStderr::new();

    let cli = process_args_with_config(&mut stderr);

    let config = match AnalyzerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            stderr
                .writeln(&format!("logtally: Error: {}", e))
                .unwrap_or(());
            ExitCode::InvalidUsage.exit();
        }
    };
    config.install_diagnostics();

    let report = match logtally::run_analysis(&config) {
        Ok(report) => report,
        Err(e) => {
            stderr
                .writeln(&config.format_error_message(&format!("{:#}", e)))
                .unwrap_or(());
            ExitCode::GeneralError.exit();
        }
    };

    render_summaries(&config, &report)?;
    export_summaries(&config, &report);
    index_summaries(&config, &report);

    if config.output.stats {
        stderr
            .writeln(&config.format_stats_message(&report.stats.format_stats()))
            .unwrap_or(());
    }

    if report.interrupted || SignalHandler::should_terminate() {
        SignalHandler::signal_exit_code().exit();
    }

    if report.has_failures() {
        stderr
            .writeln(&config.format_error_message(&format!(
                "{} of {} files failed",
                report.failures.len(),
                report.stats.files_discovered
            )))
            .unwrap_or(());
        ExitCode::GeneralError.exit();
    }

    Ok(())
}

/// Print every summary to stdout, newest first
fn render_summaries(config: &AnalyzerConfig, report: &AnalysisReport) -> Result<()> {
    let use_colors = tty::should_use_colors_with_mode(&config.output.color);
    let Some(formatter) = create_formatter(&config.output.format, use_colors) else {
        return Ok(());
    };

    let mut stdout = SafeStdout::new();
    for summary in &report.summaries {
        writeln!(stdout, "{}", formatter.format(summary))?;
    }
    stdout.flush()?;
    Ok(())
}

/// Write one CSV per summary; a failed export never stops the run
fn export_summaries(config: &AnalyzerConfig, report: &AnalysisReport) {
    let Some(dir) = &config.output.export_dir else {
        return;
    };

    let mut exporter = CsvExporter::new(dir);
    for summary in &report.summaries {
        match exporter.export(summary) {
            Ok(path) => emit_info(&format!(
                "Exported '{}' to '{}'",
                summary.name,
                path.display()
            )),
            Err(e) => emit_warning(&format!("Export of '{}' failed: {:#}", summary.name, e)),
        }
    }
}

/// Index every aggregate into the configured sink
fn index_summaries(config: &AnalyzerConfig, report: &AnalysisReport) {
    let endpoint = config.output.sink.as_deref();
    let mut sink = match open_sink(endpoint) {
        Ok(sink) => sink,
        Err(e) => {
            emit_warning(&format!(
                "Sink '{}' unavailable: {:#}",
                endpoint.unwrap_or_default(),
                e
            ));
            return;
        }
    };

    let indexed: usize = report
        .summaries
        .iter()
        .map(|summary| dump_summary(sink.as_mut(), summary))
        .sum();

    if let Err(e) = sink.flush() {
        emit_warning(&format!("{:#}", e));
    }
    if let Some(endpoint) = endpoint {
        emit_info(&format!("Indexed {} records into '{}'", indexed, endpoint));
    }
}

/// Apply config file defaults and aliases, then parse the command line
fn process_args_with_config(stderr: &mut SafeStderr) -> Cli {
    let raw_args: Vec<String> = std::env::args().collect();
    let flags = ConfigFlags::scan(&raw_args);

    if flags.show {
        print!("{}", ConfigFile::describe(flags.path.as_deref()));
        ExitCode::Success.exit();
    }

    let processed_args = if flags.ignore {
        raw_args
    } else {
        match ConfigFile::load(flags.path.as_deref()) {
            Ok(config_file) => match config_file.process_args(raw_args) {
                Ok(processed) => processed,
                Err(e) => {
                    stderr
                        .writeln(&format!("logtally: Config error: {:#}", e))
                        .unwrap_or(());
                    ExitCode::GeneralError.exit();
                }
            },
            Err(e) => {
                stderr
                    .writeln(&format!("logtally: Config file error: {:#}", e))
                    .unwrap_or(());
                ExitCode::GeneralError.exit();
            }
        }
    };

    let matches = Cli::command().get_matches_from(processed_args);
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| {
        stderr
            .writeln(&format!("logtally: Error: {}", e))
            .unwrap_or(());
        ExitCode::InvalidUsage.exit();
    })
}
