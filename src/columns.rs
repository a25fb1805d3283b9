//! Header resolution for delimited log exports
//!
//! Maps the configured column names onto zero-based positions of a single
//! file's header row. Unmatched names resolve to `None`; callers decide what a
//! missing column means for the file.

/// Strip one layer of surrounding double quotes (`"CDN"` and `CDN` compare equal)
pub fn trim_quotes(field: &str) -> &str {
    let field = field.trim_end_matches('\r');
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

/// Column names requested for one analysis run
#[derive(Debug, Clone, Copy)]
pub struct ColumnRequest<'a> {
    pub dimension: &'a str,
    pub filter_key: Option<&'a str>,
    pub metadata: Option<&'a str>,
}

/// Resolved positions for a single header row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnIndices {
    pub dimension: Option<usize>,
    pub filter: Option<usize>,
    pub metadata: Option<usize>,
}

impl ColumnIndices {
    /// Resolve every requested name against `header`.
    ///
    /// Linear scan; when a name occurs more than once the last occurrence wins.
    pub fn resolve<'h, I>(header: I, request: &ColumnRequest<'_>) -> Self
    where
        I: IntoIterator<Item = &'h str>,
    {
        let mut indices = Self::default();

        for (pos, raw) in header.into_iter().enumerate() {
            let name = trim_quotes(raw);
            if name == request.dimension {
                indices.dimension = Some(pos);
            }
            if request.filter_key == Some(name) {
                indices.filter = Some(pos);
            }
            if request.metadata == Some(name) {
                indices.metadata = Some(pos);
            }
        }

        indices
    }

    /// Resolve from an unsplit header line
    pub fn resolve_line(line: &str, delimiter: char, request: &ColumnRequest<'_>) -> Self {
        Self::resolve(line.split(delimiter), request)
    }
}
