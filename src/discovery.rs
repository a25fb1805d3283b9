use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Escape glob metacharacters in a literal path component
fn escape_glob(literal: &str) -> String {
    glob::Pattern::escape(literal)
}

/// Build the `<dir>/*.<ext>` pattern; an empty dir means the current directory
pub fn input_pattern(dir: &Path, extension: &str) -> String {
    let ext = extension.trim_start_matches('.');
    if dir.as_os_str().is_empty() {
        format!("*.{}", escape_glob(ext))
    } else {
        let dir = escape_glob(&dir.to_string_lossy());
        format!("{}/*.{}", dir.trim_end_matches('/'), escape_glob(ext))
    }
}

/// Find every regular file in `dir` with the given extension
///
/// Results are returned in glob order (alphabetical). Unreadable entries are
/// skipped; an invalid pattern is an error.
pub fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = input_pattern(dir, extension);
    let entries = glob::glob(&pattern)
        .with_context(|| format!("Invalid input pattern '{}'", pattern))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                crate::config::emit_warning(&format!(
                    "Cannot inspect '{}': {}",
                    e.path().display(),
                    e.error()
                ));
            }
        }
    }

    Ok(files)
}
