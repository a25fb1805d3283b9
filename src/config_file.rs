//! INI configuration file: default arguments and named aliases
//!
//! ```ini
//! defaults = --jobs 8 --stats
//!
//! [aliases]
//! chromecast = --filter-key Device --filter-value Chromecast
//! cdn = -c CDN --no-suffix
//! ```
//!
//! Lookup order: `--config-file` if given, otherwise the first existing user
//! file overlaid by the nearest project `.logtallyrc`.

use anyhow::{anyhow, Context, Result};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = ".logtallyrc";
const MAX_ALIAS_DEPTH: usize = 10;

/// Where a configuration file was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Project,
    User,
    Custom,
}

impl std::fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigScope::Project => write!(f, "Project"),
            ConfigScope::User => write!(f, "User"),
            ConfigScope::Custom => write!(f, "Custom"),
        }
    }
}

/// Config-related flags that must be known before clap parses anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFlags {
    pub path: Option<String>,
    pub ignore: bool,
    pub show: bool,
}

impl ConfigFlags {
    pub fn scan(args: &[String]) -> Self {
        let mut flags = Self::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config-file" => flags.path = iter.next().cloned(),
                "--ignore-config" => flags.ignore = true,
                "--show-config" => flags.show = true,
                other => {
                    if let Some(path) = other.strip_prefix("--config-file=") {
                        flags.path = Some(path.to_string());
                    }
                }
            }
        }
        flags
    }
}

/// Parsed configuration, possibly merged from several files
#[derive(Debug, Default, Clone)]
pub struct ConfigFile {
    pub defaults: Option<String>,
    pub aliases: HashMap<String, String>,
    pub sources: Vec<(ConfigScope, PathBuf)>,
}

impl ConfigFile {
    /// Walk up from the current directory looking for a project file
    pub fn find_project_config() -> Option<PathBuf> {
        let mut current = env::current_dir().ok()?;
        loop {
            let candidate = current.join(PROJECT_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// User config locations in order of preference
    pub fn user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if cfg!(windows) {
            if let Ok(appdata) = env::var("APPDATA") {
                paths.push(PathBuf::from(appdata).join("logtally").join("config.ini"));
            }
            if let Ok(profile) = env::var("USERPROFILE") {
                paths.push(PathBuf::from(profile).join(PROJECT_FILE));
            }
        } else {
            let xdg_config = env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    env::var("HOME")
                        .map(|h| PathBuf::from(h).join(".config"))
                        .unwrap_or_else(|_| PathBuf::from(".config"))
                });
            paths.push(xdg_config.join("logtally").join("config.ini"));

            if let Ok(home) = env::var("HOME") {
                paths.push(PathBuf::from(home).join(PROJECT_FILE));
            }
        }

        paths
    }

    /// Load the explicit file, or merge user and project files
    pub fn load(custom_path: Option<&str>) -> Result<Self> {
        if let Some(path) = custom_path {
            let path = PathBuf::from(path);
            return Self::load_from_path(&path, ConfigScope::Custom);
        }

        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_paths().into_iter().find(|p| p.is_file()) {
            config = config.merge(Self::load_from_path(&user_path, ConfigScope::User)?);
        }

        if let Some(project_path) = Self::find_project_config() {
            config = config.merge(Self::load_from_path(&project_path, ConfigScope::Project)?);
        }

        Ok(config)
    }

    pub fn load_from_path(path: &Path, scope: ConfigScope) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.sources.push((scope, path.to_path_buf()));
        Ok(config)
    }

    /// Parse INI content
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section = String::new();

        for (number, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_string();
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected 'key = value'", number + 1))?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                return Err(anyhow!("line {}: empty key", number + 1));
            }

            match section.as_str() {
                "" if key == "defaults" => config.defaults = Some(value.to_string()),
                "aliases" => {
                    config.aliases.insert(key.to_string(), value.to_string());
                }
                // Unknown keys and sections are ignored
                _ => {}
            }
        }

        Ok(config)
    }

    /// Overlay `other` on top of `self`
    pub fn merge(mut self, other: Self) -> Self {
        if other.defaults.is_some() {
            self.defaults = other.defaults;
        }
        self.aliases.extend(other.aliases);
        self.sources.extend(other.sources);
        self
    }

    /// Expand one alias, following nested `-a`/`--alias` references
    pub fn resolve_alias(&self, name: &str) -> Result<Vec<String>> {
        let mut chain = HashSet::new();
        self.resolve_alias_inner(name, &mut chain, 0)
    }

    fn resolve_alias_inner(
        &self,
        name: &str,
        chain: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(anyhow!("Alias chain too deep: {} levels", depth));
        }
        if !chain.insert(name.to_string()) {
            return Err(anyhow!("Circular dependency detected in alias: {}", name));
        }

        let value = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("Unknown alias: {}", name))?;
        let words = shell_words::split(value)
            .with_context(|| format!("Invalid alias '{}': failed to parse arguments", name))?;

        let expanded = self.expand_aliases(words, chain, depth + 1)?;
        chain.remove(name);
        Ok(expanded)
    }

    fn expand_aliases(
        &self,
        args: Vec<String>,
        chain: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        let mut result = Vec::with_capacity(args.len());
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            let inline = arg
                .strip_prefix("--alias=")
                .map(str::to_string);
            let name = match (arg.as_str(), inline) {
                (_, Some(name)) => Some(name),
                ("-a" | "--alias", None) => iter.next(),
                _ => None,
            };

            match name {
                Some(name) => result.extend(self.resolve_alias_inner(&name, chain, depth)?),
                None => result.push(arg),
            }
        }

        Ok(result)
    }

    /// Insert defaults after the program name, then expand aliases
    pub fn process_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut iter = args.into_iter();
        let mut combined: Vec<String> = iter.next().into_iter().collect();

        if let Some(defaults) = &self.defaults {
            let words = shell_words::split(defaults)
                .context("Invalid defaults: failed to parse arguments")?;
            combined.extend(words);
        }
        combined.extend(iter);

        self.expand_aliases(combined, &mut HashSet::new(), 0)
    }

    /// Human-readable report for `--show-config`
    pub fn describe(custom_path: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Configuration precedence: CLI > project {} > user config > defaults\n",
            PROJECT_FILE
        );

        match Self::load(custom_path) {
            Ok(config) => {
                if config.sources.is_empty() {
                    let _ = writeln!(out, "No configuration files found. Using defaults.");
                } else {
                    let _ = writeln!(out, "Configuration loaded from:");
                    for (scope, path) in &config.sources {
                        let _ = writeln!(out, "  {}: {}", scope, path.display());
                    }
                }

                if let Some(defaults) = &config.defaults {
                    let _ = writeln!(out, "\nActive defaults:\n  defaults = {}", defaults);
                }

                if !config.aliases.is_empty() {
                    let _ = writeln!(out, "\nActive aliases:");
                    let mut sorted: Vec<_> = config.aliases.iter().collect();
                    sorted.sort_by_key(|(name, _)| name.as_str());
                    for (name, value) in sorted {
                        let _ = writeln!(out, "  {} = {}", name, value);
                    }
                }

                if config.sources.is_empty() {
                    let _ = writeln!(out, "\nExample configuration file ({}):\n", PROJECT_FILE);
                    let _ = writeln!(out, "defaults = --jobs 8 --stats\n");
                    let _ = writeln!(out, "[aliases]");
                    let _ = writeln!(
                        out,
                        "chromecast = --filter-key Device --filter-value Chromecast"
                    );
                    let _ = writeln!(out, "cdn = -c CDN --no-suffix");
                }
            }
            Err(e) => {
                let _ = writeln!(out, "Error loading configuration: {:#}", e);
            }
        }

        let _ = writeln!(out, "\nConfiguration search locations (in precedence order):");
        match Self::find_project_config() {
            Some(path) => {
                let _ = writeln!(out, "  1. Project: {} (found)", path.display());
            }
            None => {
                let _ = writeln!(
                    out,
                    "  1. Project: {} (searched up directory tree, not found)",
                    PROJECT_FILE
                );
            }
        }
        for (i, path) in Self::user_config_paths().iter().enumerate() {
            let status = if path.is_file() { "(found)" } else { "(not found)" };
            let _ = writeln!(out, "  {}. User: {} {}", i + 2, path.display(), status);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn sample() -> ConfigFile {
        ConfigFile::parse(
            "# comment\n\
             defaults = --jobs 2\n\
             \n\
             [aliases]\n\
             chromecast = --filter-key Device --filter-value 'Chromecast Ultra'\n\
             cdn = -c CDN --no-suffix\n\
             both = -a cdn --alias chromecast\n\
             loop-a = -a loop-b\n\
             loop-b = --alias=loop-a\n",
        )
        .unwrap()
    }

    #[test]
    fn test_parse_sections() {
        let config = sample();
        assert_eq!(config.defaults.as_deref(), Some("--jobs 2"));
        assert_eq!(config.aliases.len(), 5);
        assert_eq!(config.aliases["cdn"], "-c CDN --no-suffix");
    }

    #[test]
    fn test_parse_rejects_garbage_line() {
        let err = ConfigFile::parse("defaults = -s\nnot a setting\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_process_args_applies_defaults_first() {
        let config = sample();
        let processed = config
            .process_args(args(&["logtally", "-j", "5", "dir"]))
            .unwrap();
        assert_eq!(processed, args(&["logtally", "--jobs", "2", "-j", "5", "dir"]));
    }

    #[test]
    fn test_alias_expansion_with_quoting() {
        let config = sample();
        let processed = config
            .process_args(args(&["logtally", "-a", "chromecast"]))
            .unwrap();
        assert_eq!(
            processed,
            args(&[
                "logtally",
                "--jobs",
                "2",
                "--filter-key",
                "Device",
                "--filter-value",
                "Chromecast Ultra"
            ])
        );
    }

    #[test]
    fn test_nested_aliases() {
        let config = sample();
        let expanded = config.resolve_alias("both").unwrap();
        assert_eq!(
            expanded,
            args(&[
                "-c",
                "CDN",
                "--no-suffix",
                "--filter-key",
                "Device",
                "--filter-value",
                "Chromecast Ultra"
            ])
        );
    }

    #[test]
    fn test_alias_cycle_is_detected() {
        let err = sample().resolve_alias("loop-a").unwrap_err();
        assert!(err.to_string().contains("Circular"));
    }

    #[test]
    fn test_unknown_alias() {
        let err = sample()
            .process_args(args(&["logtally", "--alias", "nope"]))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown alias: nope"));
    }

    #[test]
    fn test_merge_prefers_overlay() {
        let base = ConfigFile::parse("defaults = -j 1\n[aliases]\na = -s\nb = -v\n").unwrap();
        let overlay = ConfigFile::parse("defaults = -j 9\n[aliases]\na = -q\n").unwrap();
        let merged = base.merge(overlay);
        assert_eq!(merged.defaults.as_deref(), Some("-j 9"));
        assert_eq!(merged.aliases["a"], "-q");
        assert_eq!(merged.aliases["b"], "-v");
    }

    #[test]
    fn test_load_custom_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[aliases]\nquiet = -q").unwrap();
        file.flush().unwrap();

        let path = file.path().to_string_lossy().to_string();
        let config = ConfigFile::load(Some(&path)).unwrap();
        assert_eq!(config.aliases["quiet"], "-q");
        assert_eq!(config.sources[0].0, ConfigScope::Custom);
    }

    #[test]
    fn test_load_missing_custom_path_fails() {
        assert!(ConfigFile::load(Some("/nonexistent/logtally.ini")).is_err());
    }

    #[test]
    fn test_scan_flags() {
        let flags = ConfigFlags::scan(&args(&[
            "logtally",
            "--config-file",
            "x.ini",
            "--ignore-config",
        ]));
        assert_eq!(flags.path.as_deref(), Some("x.ini"));
        assert!(flags.ignore);
        assert!(!flags.show);

        let flags = ConfigFlags::scan(&args(&["logtally", "--config-file=y.ini", "--show-config"]));
        assert_eq!(flags.path.as_deref(), Some("y.ini"));
        assert!(flags.show);
    }
}
