use crate::cli::ColorMode;
use is_terminal::IsTerminal;

/// Check if stdout is connected to a TTY
pub fn is_stdout_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Check if stderr is connected to a TTY
pub fn is_stderr_tty() -> bool {
    std::io::stderr().is_terminal()
}

/// Determine if colors should be used based on CLI color mode and environment
pub fn should_use_colors_with_mode(color_mode: &ColorMode) -> bool {
    match color_mode {
        ColorMode::Never => false,
        ColorMode::Always => {
            // Even with Always, respect NO_COLOR for security/accessibility
            std::env::var("NO_COLOR").is_err()
        }
        ColorMode::Auto => should_use_colors_auto(),
    }
}

/// Auto color detection logic
fn should_use_colors_auto() -> bool {
    if !is_stdout_tty() {
        return false;
    }

    // Respect NO_COLOR environment variable (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    true
}

/// Emoji prefixes only make sense when a person reads stderr
pub fn should_use_emoji_for_stderr() -> bool {
    is_stderr_tty() && std::env::var("NO_EMOJI").is_err()
}

/// Width available for the console report
pub fn report_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(80)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_disables_colors() {
        assert!(!should_use_colors_with_mode(&ColorMode::Never));
    }

    #[test]
    fn test_report_width_has_fallback() {
        assert!(report_width() > 0);
    }
}
