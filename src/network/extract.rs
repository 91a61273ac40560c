//! Section and field extraction for interface-definition text
//!
//! Both operations work on raw text and never interpret the values they
//! return. Trimming is left to the caller.

use crate::error::ExtractionError;
use std::borrow::Cow;

/// Where a section stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEnd<'a> {
    /// Stop right before the first occurrence of this marker after the start
    Marker(&'a str),
    /// Run to the end of the text
    EndOfText,
}

/// Return the text between `start` and `end`.
///
/// The search runs over `text` with one leading space prepended, so a
/// marker at position 0 is still found. When `start` is absent the whole
/// space-prefixed text is returned. An end marker that never appears after
/// the start behaves like [`SectionEnd::EndOfText`].
pub fn extract_section<'a>(text: &'a str, start: &str, end: SectionEnd<'_>) -> Cow<'a, str> {
    // Offsets below are into the prefixed text; subtract 1 to index `text`.
    let prefixed = format!(" {text}");

    let begin = match prefixed.find(start) {
        Some(0) | None => return Cow::Owned(prefixed),
        Some(idx) => idx + start.len(),
    };

    let finish = match end {
        SectionEnd::Marker(marker) => prefixed[begin..]
            .find(marker)
            .map(|off| begin + off)
            .unwrap_or(prefixed.len()),
        SectionEnd::EndOfText => prefixed.len(),
    };

    Cow::Borrowed(&text[begin - 1..finish - 1])
}

/// Return the second whitespace-separated token of `line`
pub fn extract_field(line: &str) -> Result<&str, ExtractionError> {
    line.split_whitespace()
        .nth(1)
        .ok_or_else(|| ExtractionError::MissingValue {
            line: line.to_string(),
        })
}
