use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use super::record::{Record, RecordSet};

/// Field delimiter of the packing-list export.
pub const DELIMITER: char = ',';

/// Curly quotes the upstream export wraps brand names in.
const CURLY_QUOTES: [char; 2] = ['\u{201C}', '\u{201D}'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("input is empty")]
    Empty,
    #[error("no header row found")]
    MissingHeader,
}

/// Parse delimited packing-list text into records.
///
/// The first line is the header. Rows with fewer fields than the header are
/// dropped without error; surplus trailing fields are ignored because values
/// are taken by header position. Fails only when there is no usable header.
pub fn parse(text: &str) -> Result<RecordSet, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut lines = trimmed.lines();
    let header_line = lines.next().ok_or(ParseError::MissingHeader)?;
    let header: Vec<String> = header_line
        .split(DELIMITER)
        .map(|h| h.trim().to_string())
        .collect();
    if header.iter().all(|h| h.is_empty()) {
        return Err(ParseError::MissingHeader);
    }
    let columns: Arc<[String]> = header.into();

    let rows: Vec<&str> = lines.collect();
    let records: Vec<Record> = rows
        .par_iter()
        .filter_map(|line| parse_row(line, &columns))
        .collect();

    tracing::debug!(
        columns = columns.len(),
        rows = rows.len(),
        records = records.len(),
        "parsed packing list"
    );

    Ok(RecordSet::new(records))
}

fn parse_row(line: &str, columns: &Arc<[String]>) -> Option<Record> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() < columns.len() {
        return None;
    }
    let values = fields[..columns.len()]
        .iter()
        .map(|f| clean_value(f))
        .collect();
    Some(Record::new(Arc::clone(columns), values))
}

/// Trim, strip one layer of straight double quotes, and drop curly quotes.
pub fn clean_value(raw: &str) -> String {
    let mut val = raw.trim();
    if val.len() >= 2 && val.starts_with('"') && val.ends_with('"') {
        val = &val[1..val.len() - 1];
    }
    val.replace(&CURLY_QUOTES[..], "")
}
