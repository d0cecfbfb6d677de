//! Turns uploaded CSV text into header-keyed rows.
//!
//! The `csv` reader is lenient about quoting, so the text is scanned once
//! up front and rejected when a quoted field never closes or a quote shows
//! up where a field cannot contain one. The same pass drops blanks before a
//! field, so `Ana, "0987654321"` reads as a quoted cell.

use crate::domain::model::{ImportOptions, RawRow};
use thiserror::Error;

/// Column order used when the document has no header line.
pub const CANONICAL_COLUMNS: [&str; 6] = [
    "name",
    "phone",
    "email",
    "appointmenttime",
    "appointmenttype",
    "hasconsent",
];

#[derive(Error, Debug)]
pub enum TokenizeError {
    #[error("Quote not closed: the quoted field opened at line {line} never ends")]
    UnclosedQuote { line: usize },

    #[error("Invalid opening quote at line {line}: a quote can only start a field")]
    InvalidOpeningQuote { line: usize },

    #[error("Invalid closing quote at line {line}: found {found:?} instead of a delimiter")]
    InvalidClosingQuote { line: usize, found: char },

    #[error("Input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted { opened_at: usize },
    QuoteInQuoted { opened_at: usize },
    AfterClosingQuote,
}

/// Returns the text without the blanks that lead each field.
fn normalize_quoting(content: &str, delimiter: u8) -> Result<String, TokenizeError> {
    let delimiter = delimiter as char;
    let mut line = 1;
    let mut state = QuoteState::FieldStart;
    let mut normalized = String::with_capacity(content.len());

    for c in content.chars() {
        let leading_blank = matches!(state, QuoteState::FieldStart)
            && c != delimiter
            && matches!(c, ' ' | '\t');
        state = match state {
            QuoteState::FieldStart | QuoteState::Unquoted | QuoteState::AfterClosingQuote
                if c == delimiter =>
            {
                QuoteState::FieldStart
            }
            QuoteState::QuoteInQuoted { .. } if c == delimiter => QuoteState::FieldStart,
            QuoteState::FieldStart | QuoteState::Unquoted | QuoteState::AfterClosingQuote
                if c == '\n' =>
            {
                line += 1;
                QuoteState::FieldStart
            }
            QuoteState::QuoteInQuoted { .. } if c == '\n' => {
                line += 1;
                QuoteState::FieldStart
            }

            QuoteState::FieldStart => match c {
                '"' => QuoteState::Quoted { opened_at: line },
                ' ' | '\t' | '\r' => QuoteState::FieldStart,
                _ => QuoteState::Unquoted,
            },
            QuoteState::Unquoted => match c {
                '"' => return Err(TokenizeError::InvalidOpeningQuote { line }),
                _ => QuoteState::Unquoted,
            },
            QuoteState::Quoted { opened_at } => match c {
                '"' => QuoteState::QuoteInQuoted { opened_at },
                '\n' => {
                    line += 1;
                    QuoteState::Quoted { opened_at }
                }
                _ => QuoteState::Quoted { opened_at },
            },
            QuoteState::QuoteInQuoted { opened_at } => match c {
                // "" inside a quoted field is an escaped quote
                '"' => QuoteState::Quoted { opened_at },
                ' ' | '\t' | '\r' => QuoteState::AfterClosingQuote,
                found => return Err(TokenizeError::InvalidClosingQuote { line, found }),
            },
            QuoteState::AfterClosingQuote => match c {
                ' ' | '\t' | '\r' => QuoteState::AfterClosingQuote,
                found => return Err(TokenizeError::InvalidClosingQuote { line, found }),
            },
        };
        if !leading_blank {
            normalized.push(c);
        }
    }

    match state {
        QuoteState::Quoted { opened_at } => Err(TokenizeError::UnclosedQuote { line: opened_at }),
        _ => Ok(normalized),
    }
}

/// A whitespace-only line. Lines of bare delimiters are still rows.
fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}

/// Reads every non-empty data line. Missing trailing cells become `""`,
/// cells past the header width are dropped.
pub fn tokenize(content: &str, options: &ImportOptions) -> Result<Vec<RawRow>, TokenizeError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let content = normalize_quoting(content, options.delimiter)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut columns: Option<Vec<String>> = if options.skip_header {
        None
    } else {
        Some(CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect())
    };
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }

        let Some(keys) = columns.as_ref() else {
            let header: Vec<String> = record.iter().map(str::to_lowercase).collect();
            tracing::debug!("CSV header: {:?}", header);
            columns = Some(header);
            continue;
        };

        let cells = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(RawRow::new(cells));
    }

    Ok(rows)
}

pub fn tokenize_bytes(content: &[u8], options: &ImportOptions) -> Result<Vec<RawRow>, TokenizeError> {
    tokenize(std::str::from_utf8(content)?, options)
}
