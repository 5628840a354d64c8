//! # ID Range Parsing
//!
//! Text fields such as `JobId(s)` accept a comma separated list of IDs and
//! inclusive ranges:
//!
//! ```text
//! 12, 40-43, 7   ->   [7, 12, 40, 41, 42, 43]
//! ```
//!
//! The result is the sorted union of every token. A single malformed token
//! rejects the whole field; nothing is silently dropped.

use thiserror::Error;

/// Upper bound on how many IDs a single field may expand to.
pub const MAX_EXPANDED_IDS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("empty entry in list")]
    EmptyToken,

    #[error("not a number: {0}")]
    NotANumber(String),

    #[error("malformed range: {0}")]
    MalformedRange(String),

    #[error("range start is greater than its end: {0}")]
    Descending(String),

    #[error("expands to more than {MAX_EXPANDED_IDS} values")]
    TooLarge,
}

/// Parse range text into a sorted, de-duplicated list of IDs.
///
/// Blank input is valid and yields an empty list.
pub fn parse_id_ranges(raw: &str) -> Result<Vec<u64>, RangeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let mut values = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(RangeError::EmptyToken);
        }

        let parts: Vec<&str> = token.split('-').map(str::trim).collect();
        match parts.as_slice() {
            [single] => values.push(parse_number(single)?),
            [start, end] => {
                if start.is_empty() || end.is_empty() {
                    return Err(RangeError::MalformedRange(token.to_string()));
                }
                let start = parse_number(start)?;
                let end = parse_number(end)?;
                if start > end {
                    return Err(RangeError::Descending(token.to_string()));
                }
                let span = usize::try_from(end - start).map_err(|_| RangeError::TooLarge)?;
                if span >= MAX_EXPANDED_IDS || values.len() + span >= MAX_EXPANDED_IDS {
                    return Err(RangeError::TooLarge);
                }
                values.extend(start..=end);
            }
            _ => return Err(RangeError::MalformedRange(token.to_string())),
        }

        if values.len() > MAX_EXPANDED_IDS {
            return Err(RangeError::TooLarge);
        }
    }

    values.sort_unstable();
    values.dedup();
    Ok(values)
}

fn parse_number(text: &str) -> Result<u64, RangeError> {
    // `u64::from_str` accepts a leading '+', IDs never carry one
    if !text.chars().all(|c| c.is_ascii_digit()) || text.is_empty() {
        return Err(RangeError::NotANumber(text.to_string()));
    }
    text.parse::<u64>()
        .map_err(|_| RangeError::NotANumber(text.to_string()))
}
