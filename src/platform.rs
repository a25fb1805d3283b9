use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

// Cross-platform signal handling
#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGPIPE, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, flag};

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalPipe = 141, // 128 + SIGPIPE (13)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Global termination flag for graceful shutdown
pub static SHOULD_TERMINATE: AtomicBool = AtomicBool::new(false);
static TERMINATED_BY_SIGTERM: AtomicBool = AtomicBool::new(false);

/// Signal handler for graceful shutdown
///
/// The first SIGINT/SIGTERM stops admission of new files; in-flight files are
/// finished. A second signal exits immediately.
pub struct SignalHandler {
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    /// Initialize signal handling - cross-platform
    pub fn new() -> Result<Self> {
        #[cfg(unix)]
        {
            let mut signals = Signals::new([SIGINT, SIGPIPE, SIGTERM])?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                for sig in signals.forever() {
                    match sig {
                        SIGINT | SIGTERM => {
                            SHOULD_TERMINATE.store(true, Ordering::Relaxed);
                            if sig == SIGTERM {
                                TERMINATED_BY_SIGTERM.store(true, Ordering::Relaxed);
                                crate::config::emit_warning(
                                    "Received SIGTERM, finishing files in progress...",
                                );
                            }
                            shutdown_count += 1;
                            if shutdown_count > 1 {
                                Self::signal_exit_code().exit();
                            }
                        }
                        SIGPIPE => {
                            // Broken pipe - exit quietly (normal for Unix pipes)
                            SHOULD_TERMINATE.store(true, Ordering::Relaxed);
                            ExitCode::SignalPipe.exit();
                        }
                        _ => {
                            crate::config::emit_error(&format!(
                                "Received unexpected signal: {}",
                                sig
                            ));
                        }
                    }
                }
            });

            Ok(SignalHandler { _handle: handle })
        }

        #[cfg(windows)]
        {
            // Windows signal handling using flag-based approach
            let term_flag = std::sync::Arc::new(AtomicBool::new(false));
            flag::register(SIGINT, std::sync::Arc::clone(&term_flag))?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                loop {
                    thread::sleep(std::time::Duration::from_millis(100));
                    if term_flag.swap(false, Ordering::Relaxed) {
                        SHOULD_TERMINATE.store(true, Ordering::Relaxed);
                        shutdown_count += 1;
                        if shutdown_count > 1 {
                            ExitCode::SignalInt.exit();
                        }
                    }
                }
            });

            Ok(SignalHandler { _handle: handle })
        }
    }

    /// Check if we should terminate processing
    pub fn should_terminate() -> bool {
        SHOULD_TERMINATE.load(Ordering::Relaxed)
    }

    /// Exit code matching the signal that stopped the run
    pub fn signal_exit_code() -> ExitCode {
        if TERMINATED_BY_SIGTERM.load(Ordering::Relaxed) {
            ExitCode::SignalTerm
        } else {
            ExitCode::SignalInt
        }
    }
}

/// Safe wrapper for writing to stdout that handles broken pipes and other I/O errors
pub struct SafeStdout {
    stdout: io::Stdout,
}

impl SafeStdout {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    /// Flush stdout, handling errors gracefully (cross-platform)
    pub fn flush(&mut self) -> Result<()> {
        match self.stdout.flush() {
            Ok(()) => Ok(()),
            Err(e) if Self::is_broken_pipe(&e) => {
                // Broken pipe is normal - exit quietly
                ExitCode::SignalPipe.exit();
            }
            Err(e) => Err(anyhow::anyhow!("Failed to flush stdout: {}", e)),
        }
    }

    /// Cross-platform broken pipe detection
    fn is_broken_pipe(e: &io::Error) -> bool {
        #[cfg(unix)]
        {
            e.kind() == io::ErrorKind::BrokenPipe
        }
        #[cfg(windows)]
        {
            // On Windows, broken pipe manifests as different error codes
            e.kind() == io::ErrorKind::BrokenPipe
                || e.raw_os_error() == Some(232) // ERROR_NO_DATA "The pipe is being closed"
                || e.raw_os_error() == Some(109) // ERROR_BROKEN_PIPE "The pipe has been ended"
        }
    }
}

impl Default for SafeStdout {
    fn default() -> Self {
        Self::new()
    }
}

impl std::io::Write for SafeStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stdout.write(buf) {
            Err(e) if Self::is_broken_pipe(&e) => ExitCode::SignalPipe.exit(),
            other => other,
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

/// Safe wrapper for writing to stderr
pub struct SafeStderr {
    stderr: io::Stderr,
}

impl SafeStderr {
    pub fn new() -> Self {
        Self {
            stderr: io::stderr(),
        }
    }

    /// Write a line to stderr, handling errors gracefully
    pub fn writeln(&mut self, data: &str) -> Result<()> {
        match writeln!(self.stderr, "{}", data) {
            Ok(()) => Ok(()),
            Err(_) => {
                // If we can't write to stderr, there's not much we can do
                ExitCode::GeneralError.exit();
            }
        }
    }
}

impl Default for SafeStderr {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a helpful error message for file creation failures
pub fn create_helpful_error_message(path: &Path, error: &io::Error) -> String {
    let base_msg = format!("Cannot create output file '{}': {}", path.display(), error);

    let suggestion = match error.kind() {
        io::ErrorKind::PermissionDenied => {
            if path.parent().is_some_and(|p| !p.exists()) {
                "Suggestion: Parent directory does not exist, create it first"
            } else {
                "Suggestion: Check file permissions or choose a writable location"
            }
        }
        io::ErrorKind::NotFound => "Suggestion: Parent directory does not exist, create it first",
        io::ErrorKind::AlreadyExists if path.is_dir() => {
            "Suggestion: Path points to a directory, specify a filename instead"
        }
        io::ErrorKind::InvalidInput => "Suggestion: Check for invalid characters in filename",
        _ => return base_msg, // No suggestion for other errors
    };

    format!("{}\n{}", base_msg, suggestion)
}
