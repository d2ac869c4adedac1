//! Subtitle burn-in filter.

use std::path::Path;

use super::FilterSpec;

/// Escape a subtitle file path for `subtitles='<path>'`.
///
/// Backslashes become forward slashes. Every `:` is escaped as `\:` because
/// it separates filter options, which covers the drive letter in `C:/...`.
/// A `'` closes the quoted section, emits an escaped quote for the option
/// parser and reopens it: `'\\\''`.
pub fn escape_subtitles_path(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '\\' => escaped.push('/'),
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push_str("'\\\\\\''"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `subtitles='<path>'` over the picture stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitlesFilter {
    escaped_path: String,
}

impl SubtitlesFilter {
    /// Build from an (ideally absolute) subtitle file path.
    pub fn for_path(path: &Path) -> Self {
        Self {
            escaped_path: escape_subtitles_path(&path.to_string_lossy()),
        }
    }
}

impl FilterSpec for SubtitlesFilter {
    fn to_filter(&self) -> String {
        format!("subtitles='{}'", self.escaped_path)
    }
}
