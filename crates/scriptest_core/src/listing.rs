//! Parse the interpreter's `--list` output.
//!
//! The listing script prints one line per discoverable test:
//!
//! - `<path>` for a runnable test
//! - `-<path> <reason>` for a test the interpreter asks us to skip
//!
//! The reason is free text and may contain spaces; it runs to the end of the line.

use thiserror::Error;

/// Marker that prefixes a skipped entry.
pub const SKIP_MARKER: char = '-';

/// Errors raised while parsing a listing line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("malformed listing line `{line}`: skipped entry has no space before its reason")]
    MissingReasonSeparator { line: String },

    #[error("malformed listing line `{line}`: no test path")]
    EmptyPath { line: String },
}

/// One parsed line of discovery output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub path: String,
    pub skipped: bool,
    /// Empty unless `skipped` is set.
    pub skip_reason: String,
}

impl ListingLine {
    /// A runnable entry.
    pub fn runnable(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            skipped: false,
            skip_reason: String::new(),
        }
    }

    /// An entry the interpreter reported as skipped.
    pub fn skipped(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            skipped: true,
            skip_reason: reason.into(),
        }
    }
}

/// Parse a single listing line.
///
/// ## Parameters
/// - `line`: one line of `--list` output, without its line terminator.
///
/// ## Returns
/// - (`ListingLine`): the path plus skip state.
///
/// ## Errors
/// - [`ListingError::MissingReasonSeparator`] when the line carries the skip marker but no space.
/// - [`ListingError::EmptyPath`] when there is no path, as in an empty line or `- reason`.
///
/// ## Notes
/// - The path is not checked for existence; a bad path surfaces later as an execution failure.
/// - Only the first space splits a skipped line, so `-a.lua needs ffi support` yields the reason
///   `needs ffi support`.
pub fn parse_listing_line(line: &str) -> Result<ListingLine, ListingError> {
    let parsed = match line.strip_prefix(SKIP_MARKER) {
        None => ListingLine::runnable(line),
        Some(rest) => match rest.split_once(' ') {
            Some((path, reason)) => ListingLine::skipped(path, reason),
            None => return Err(ListingError::MissingReasonSeparator { line: line.to_string() }),
        },
    };

    if parsed.path.is_empty() {
        return Err(ListingError::EmptyPath { line: line.to_string() });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runnable_line_is_verbatim_path() {
        let parsed = parse_listing_line("lang/table.lua").unwrap();
        assert_eq!(parsed, ListingLine::runnable("lang/table.lua"));
        assert!(parsed.skip_reason.is_empty());
    }

    #[test]
    fn test_skipped_line_splits_on_first_space() {
        let parsed = parse_listing_line("-b.lua reason text").unwrap();
        assert_eq!(parsed.path, "b.lua");
        assert!(parsed.skipped);
        assert_eq!(parsed.skip_reason, "reason text");
    }

    #[test]
    fn test_skipped_line_with_trailing_space_has_empty_reason() {
        let parsed = parse_listing_line("-b.lua ").unwrap();
        assert_eq!(parsed, ListingLine::skipped("b.lua", ""));
    }

    #[test]
    fn test_skipped_line_without_space_is_malformed() {
        let err = parse_listing_line("-b.lua").unwrap_err();
        assert_eq!(
            err,
            ListingError::MissingReasonSeparator {
                line: "-b.lua".to_string()
            }
        );
    }

    #[test]
    fn test_skipped_line_without_path_is_malformed() {
        let err = parse_listing_line("- reason").unwrap_err();
        assert_eq!(
            err,
            ListingError::EmptyPath {
                line: "- reason".to_string()
            }
        );
        assert!(matches!(parse_listing_line("- "), Err(ListingError::EmptyPath { .. })));
    }

    #[test]
    fn test_empty_line_is_malformed() {
        assert!(matches!(parse_listing_line(""), Err(ListingError::EmptyPath { .. })));
    }

    #[test]
    fn test_dash_inside_path_is_not_a_skip() {
        let parsed = parse_listing_line("misc/a-b.lua").unwrap();
        assert!(!parsed.skipped);
        assert_eq!(parsed.path, "misc/a-b.lua");
    }

    #[test]
    fn test_runnable_line_keeps_spaces() {
        // Only skipped entries carry a reason; a runnable line is the path, whole.
        let parsed = parse_listing_line("dir with space/a.lua").unwrap();
        assert_eq!(parsed.path, "dir with space/a.lua");
        assert!(!parsed.skipped);
    }

    #[test]
    fn test_error_message_names_the_line() {
        let err = parse_listing_line("-oops").unwrap_err();
        assert!(err.to_string().contains("`-oops`"));
    }
}
