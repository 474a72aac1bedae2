//! Row splitter: delimiter resolution by MIME type and cell extraction.
//!
//! The delimiter is never sniffed from the content. Each supported MIME type
//! carries a fixed set of candidate delimiters, and a type that admits more
//! than one (`text/plain`) refuses to split until the caller disambiguates.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::{Result, SiftError};

/// Quote characters stripped from every cell, whether or not they were used
/// to escape an embedded delimiter.
const QUOTE_CHARS: [char; 2] = ['"', '\''];

/// Fixed MIME type to delimiter mapping.
static MIME_DELIMITERS: Lazy<IndexMap<&'static str, &'static [char]>> = Lazy::new(|| {
    IndexMap::from([
        ("text/tab-separated-values", &['\t'] as &[char]),
        ("text/csv", &[','] as &[char]),
        ("text/plain", &['\t', ','] as &[char]),
    ])
});

/// Result of splitting one raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The line split into trimmed, unquoted cells.
    Cells(Vec<String>),
    /// The resolved delimiter does not occur in the line and more than one
    /// column was expected. This is bad data, not a wiring defect.
    NotDelimited,
}

/// All candidate delimiters for a MIME type.
pub fn delimiters_for(mime_type: &str) -> Result<&'static [char]> {
    MIME_DELIMITERS
        .get(mime_type)
        .copied()
        .ok_or_else(|| SiftError::UnsupportedMimeType(mime_type.to_string()))
}

/// The single usable delimiter for a MIME type.
///
/// Fails with [`SiftError::AmbiguousMimeType`] when the type admits more
/// than one delimiter; the splitter never guesses.
pub fn delimiter_for(mime_type: &str) -> Result<char> {
    let candidates = delimiters_for(mime_type)?;
    match candidates {
        [single] => Ok(*single),
        _ => Err(SiftError::AmbiguousMimeType {
            mime: mime_type.to_string(),
            delimiters: candidates.to_vec(),
        }),
    }
}

/// Whether a MIME type has any delimiter mapping at all.
pub fn is_supported_mime_type(mime_type: &str) -> bool {
    MIME_DELIMITERS.contains_key(mime_type)
}

/// Supported MIME types in declaration order.
pub fn supported_mime_types() -> Vec<&'static str> {
    MIME_DELIMITERS.keys().copied().collect()
}

/// Split one raw line according to its declared MIME type.
///
/// When the resolved delimiter does not occur in the line, the whole trimmed
/// line is returned as the single cell if exactly one column is expected;
/// otherwise [`SplitOutcome::NotDelimited`] is returned.
pub fn split_row(line: &str, mime_type: &str, expected_columns: usize) -> Result<SplitOutcome> {
    let delimiter = delimiter_for(mime_type)?;

    if !line.contains(delimiter) {
        if expected_columns == 1 {
            return Ok(SplitOutcome::Cells(vec![clean_cell(line)]));
        }
        return Ok(SplitOutcome::NotDelimited);
    }

    Ok(SplitOutcome::Cells(split_with(line, delimiter)))
}

/// Split a line on an explicit delimiter, trimming and unquoting each cell.
pub fn split_with(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(clean_cell).collect()
}

/// Trim surrounding whitespace and quote characters from a raw cell.
fn clean_cell(raw: &str) -> String {
    raw.trim().trim_matches(QUOTE_CHARS).trim().to_string()
}
