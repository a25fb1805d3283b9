//! Embedded content hash extraction
//!
//! Retried events carry the same content hash somewhere inside the raw line.
//! The hash is located textually between two literal markers, so rows that do
//! not survive delimited parsing can still be correlated.

/// Literal markers bounding the hash region of a raw record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashMarkers {
    pub start: String,
    pub end: String,
    /// Characters dropped on each side of the region between the markers
    pub trim: usize,
}

impl Default for HashMarkers {
    fn default() -> Self {
        Self {
            start: "hash=".to_string(),
            end: ";".to_string(),
            trim: 0,
        }
    }
}

impl HashMarkers {
    pub fn new(start: impl Into<String>, end: impl Into<String>, trim: usize) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            trim,
        }
    }

    /// Return the hash embedded in `line`, or `""` when there is none.
    ///
    /// The end marker is searched after the start marker. Missing markers,
    /// markers out of order and a trim wider than the region all yield `""`.
    pub fn extract<'a>(&self, line: &'a str) -> &'a str {
        if self.start.is_empty() || self.end.is_empty() {
            return "";
        }

        let Some(start_pos) = line.find(&self.start) else {
            return "";
        };
        let region_start = start_pos + self.start.len();

        let Some(end_offset) = line[region_start..].find(&self.end) else {
            return "";
        };
        let region_end = region_start + end_offset;

        let from = region_start + self.trim;
        let to = match region_end.checked_sub(self.trim) {
            Some(to) => to,
            None => return "",
        };
        if from >= to {
            return "";
        }

        line.get(from..to).unwrap_or("")
    }
}
