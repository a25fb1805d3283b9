//! Parallel file analysis for logtally
//!
//! Every discovered file is analyzed on its own worker thread; a counting
//! admission gate bounds how many files are in flight at once.
//!
//! # Module Structure
//!
//! - `types`: File lifecycle, outcomes, errors and configuration
//! - `gate`: Counting admission gate (semaphore) bounding concurrency
//! - `worker`: Runs a single file through its lifecycle
//! - `processor`: Main ParallelProcessor orchestration and join barrier

mod gate;
mod processor;
mod types;
mod worker;

// Re-export public types
pub use gate::{AdmissionGate, Permit};
pub use processor::{AnalysisReport, ParallelProcessor};
pub use types::{
    FileError, FileErrorKind, FileOutcome, FileState, ParallelConfig, SkipReason, SkippedFile,
};
