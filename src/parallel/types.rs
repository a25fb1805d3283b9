//! Type definitions for parallel file analysis
//!
//! Contains the per-file lifecycle, outcomes and the errors a worker can report.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::aggregate::FileSummary;
use crate::cli::FileOrder;

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Maximum number of files analyzed at once
    pub num_workers: usize,
    pub file_order: FileOrder,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            file_order: FileOrder::Cli,
        }
    }
}

/// Lifecycle of one input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    Reading,
    HeaderResolved,
    Aggregating,
    Finalized,
    Skipped,
    Failed,
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileState::Pending => "pending",
            FileState::Reading => "reading",
            FileState::HeaderResolved => "header resolved",
            FileState::Aggregating => "aggregating",
            FileState::Finalized => "finalized",
            FileState::Skipped => "skipped",
            FileState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a readable file produced no summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyFile,
    MissingColumn { role: &'static str, name: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyFile => f.write_str("file has no header row"),
            SkipReason::MissingColumn { role, name } => {
                write!(f, "{} column '{}' not found in header", role, name)
            }
        }
    }
}

/// A file that was read but deliberately left out of the results
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub enum FileErrorKind {
    Io(io::Error),
    Panicked(String),
}

/// Unrecoverable failure of a single file; other files are unaffected
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    /// State the file was in when it failed
    pub state: FileState,
    pub kind: FileErrorKind,
}

impl FileError {
    pub fn io(path: PathBuf, state: FileState, source: io::Error) -> Self {
        Self {
            path,
            state,
            kind: FileErrorKind::Io(source),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FileErrorKind::Io(e) => write!(
                f,
                "'{}' failed while {}: {}",
                self.path.display(),
                self.state,
                e
            ),
            FileErrorKind::Panicked(msg) => write!(
                f,
                "'{}' worker panicked while {}: {}",
                self.path.display(),
                self.state,
                msg
            ),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FileErrorKind::Io(e) => Some(e),
            FileErrorKind::Panicked(_) => None,
        }
    }
}

/// Terminal result of one file's worker
#[derive(Debug)]
pub enum FileOutcome {
    Analyzed(FileSummary),
    Skipped(SkippedFile),
    Failed(FileError),
}

impl FileOutcome {
    pub fn state(&self) -> FileState {
        match self {
            FileOutcome::Analyzed(_) => FileState::Finalized,
            FileOutcome::Skipped(_) => FileState::Skipped,
            FileOutcome::Failed(_) => FileState::Failed,
        }
    }
}
