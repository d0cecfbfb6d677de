use crate::core::tokenizer::{tokenize, tokenize_bytes, TokenizeError};
use crate::core::validator::validate_row;
use crate::domain::model::{ErrorField, ImportOptions, ParseResult, RawRow, ValidationError};

fn file_error(error: &TokenizeError) -> ParseResult {
    tracing::warn!("CSV document could not be tokenized: {}", error);
    ParseResult {
        patients: Vec::new(),
        errors: vec![ValidationError::new(
            0,
            ErrorField::File,
            "",
            format!("Error al parsear CSV: {}", error),
        )],
        total_rows: 0,
        valid_rows: 0,
        // A file-level failure counts no rows as invalid.
        invalid_rows: 0,
    }
}

/// Validates tokenized rows in order and splits them into accepted
/// patients and per-field errors.
pub fn aggregate(rows: &[RawRow], options: &ImportOptions) -> ParseResult {
    let mut patients = Vec::new();
    let mut errors = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match validate_row(row, index + 1, options) {
            Ok(patient) => patients.push(patient),
            Err(row_errors) => {
                tracing::debug!("Row {} rejected with {} errors", index + 1, row_errors.len());
                errors.extend(row_errors);
            }
        }
    }

    let total_rows = rows.len();
    let valid_rows = patients.len();
    let invalid_rows = if errors.is_empty() {
        0
    } else {
        total_rows - valid_rows
    };

    ParseResult {
        patients,
        errors,
        total_rows,
        valid_rows,
        invalid_rows,
    }
}

pub fn parse_patients_csv(content: &str, options: &ImportOptions) -> ParseResult {
    match tokenize(content, options) {
        Ok(rows) => aggregate(&rows, options),
        Err(e) => file_error(&e),
    }
}

pub fn parse_patients_csv_bytes(content: &[u8], options: &ImportOptions) -> ParseResult {
    match tokenize_bytes(content, options) {
        Ok(rows) => aggregate(&rows, options),
        Err(e) => file_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const HEADER: &str = "name,phone,email,appointmentTime,hasConsent";

    #[test]
    fn test_counts_for_mixed_batch() {
        let csv = format!(
            "{}\nAna,0987654321,,2026-01-20T10:00:00,si\nLuis,12,luis@,,no\nEva,593987654322,,2026-01-21,1\n",
            HEADER
        );
        let result = parse_patients_csv(&csv, &ImportOptions::default());

        assert_eq!(result.total_rows, 3);
        assert_eq!(result.valid_rows, 2);
        assert_eq!(result.invalid_rows, 1);
        assert_eq!(result.patients[0].name, "Ana");
        assert_eq!(result.patients[1].name, "Eva");
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors.iter().all(|e| e.row == 2));
    }

    #[test]
    fn test_every_row_is_valid_or_erroneous() {
        let csv = format!(
            "{}\nA,0987654321,,2026-01-20,si\nB,,,,\nC,0987654321,bad,2026-01-20,si\nD,987654321,d@x.ec,2026-01-20T08:30,TRUE\n",
            HEADER
        );
        let result = parse_patients_csv(&csv, &ImportOptions::default());
        let erroneous: BTreeSet<usize> = result.errors.iter().map(|e| e.row).collect();

        assert_eq!(result.valid_rows + erroneous.len(), result.total_rows);
        assert_eq!(erroneous, BTreeSet::from([2, 3]));
        assert_eq!(result.invalid_rows, 2);
    }

    #[test]
    fn test_errors_follow_row_order() {
        let csv = format!("{}\nA,1,,,no\nB,2,,,no\n", HEADER);
        let rows: Vec<usize> = parse_patients_csv(&csv, &ImportOptions::default())
            .errors
            .iter()
            .map(|e| e.row)
            .collect();
        let mut sorted = rows.clone();
        sorted.sort();
        assert_eq!(rows, sorted);
    }

    #[test]
    fn test_no_errors_means_no_invalid_rows() {
        let result = parse_patients_csv(HEADER, &ImportOptions::default());
        assert_eq!(result, ParseResult::default());
    }

    #[test]
    fn test_file_error_keeps_invalid_rows_at_zero() {
        let result = parse_patients_csv(
            &format!("{}\n\"Ana,0987654321,,2026-01-20,si\n", HEADER),
            &ImportOptions::default(),
        );
        assert_eq!(result.total_rows, 0);
        assert_eq!(result.valid_rows, 0);
        assert_eq!(result.invalid_rows, 0);
        assert!(result.patients.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 0);
        assert_eq!(result.errors[0].field, ErrorField::File);
        assert_eq!(result.errors[0].value, "");
        assert!(result.errors[0].message.starts_with("Error al parsear CSV: "));
        assert!(result.is_rejected());
    }

    #[test]
    fn test_bytes_with_bad_encoding_are_a_file_error() {
        let result = parse_patients_csv_bytes(b"name\n\xc3\x28\n", &ImportOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, ErrorField::File);
    }
}
