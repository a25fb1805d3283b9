/// ANSI color codes for the console report
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub label: &'static str,       // Green for DATE/CSV labels
    pub description: &'static str, // No color for descriptions
    pub percentage: &'static str,  // Bright yellow for percentages
    pub count: &'static str,       // No color for counts
    pub undated: &'static str,     // Bright red for missing dates
    pub reset: &'static str,       // Reset to default color
}

impl ColorScheme {
    pub fn new(use_colors: bool) -> Self {
        if use_colors {
            Self {
                label: "\x1b[32m",
                description: "",
                percentage: "\x1b[93m",
                count: "",
                undated: "\x1b[91m",
                reset: "\x1b[0m",
            }
        } else {
            // All empty strings for no-color mode
            Self {
                label: "",
                description: "",
                percentage: "",
                count: "",
                undated: "",
                reset: "",
            }
        }
    }

    /// Wrap `text` in `color`, leaving it untouched when the color is empty
    pub fn paint(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", color, text, self.reset)
        }
    }
}
