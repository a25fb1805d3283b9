// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Run logtally with the given arguments
pub fn run_logtally(args: &[&str]) -> (String, String, i32) {
    run_logtally_in(None, args)
}

/// Run logtally from `cwd` (if any), isolated from the user's config files
pub fn run_logtally_in(cwd: Option<&Path>, args: &[&str]) -> (String, String, i32) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_logtally"));
    cmd.args(args)
        .env("NO_COLOR", "1")
        .env("NO_EMOJI", "1")
        .env("HOME", "/nonexistent-logtally-home")
        .env("XDG_CONFIG_HOME", "/nonexistent-logtally-home/.config")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().expect("Failed to execute logtally");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Directory of export files for one test
pub struct ExportDir {
    pub dir: TempDir,
}

impl ExportDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_str(&self) -> String {
        self.dir.path().to_string_lossy().to_string()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("Failed to write export file");
        path
    }
}

/// Parse JSON-lines stdout into values
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("Line should be valid JSON"))
        .collect()
}
