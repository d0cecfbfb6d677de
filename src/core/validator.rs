use crate::core::consent::ConsentValue;
use crate::core::phone::{is_canonical_ecuador_phone, normalize_ecuador_phone};
use crate::domain::model::{
    ConsentGranted, ErrorField, ImportOptions, ParsedPatient, RawRow, ValidationError,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

/// ISO 8601 style timestamps. Without an explicit offset the value is read
/// as local time at `offset`; a bare date means midnight.
pub fn parse_appointment_time(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

fn check_name(row: &RawRow, row_number: usize) -> Result<String, ValidationError> {
    let name = row.get("name").trim();
    if name.is_empty() {
        return Err(ValidationError::new(
            row_number,
            ErrorField::Name,
            row.get("name"),
            "El nombre es requerido",
        ));
    }
    Ok(name.to_string())
}

fn check_phone(row: &RawRow, row_number: usize) -> Result<String, ValidationError> {
    let raw = row.get("phone");
    if raw.trim().is_empty() {
        return Err(ValidationError::new(
            row_number,
            ErrorField::Phone,
            raw,
            "El teléfono es requerido",
        ));
    }

    let normalized = normalize_ecuador_phone(raw);
    if !is_canonical_ecuador_phone(&normalized) {
        return Err(ValidationError::new(
            row_number,
            ErrorField::Phone,
            raw,
            format!(
                "Teléfono inválido. Formato esperado: +593XXXXXXXXX o 0XXXXXXXXX. Recibido: {}",
                raw
            ),
        ));
    }
    Ok(normalized)
}

fn check_email(row: &RawRow, row_number: usize) -> Result<Option<String>, ValidationError> {
    let raw = row.get("email");
    let email = raw.trim();
    if email.is_empty() {
        return Ok(None);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::new(
            row_number,
            ErrorField::Email,
            raw,
            "Email inválido",
        ));
    }
    Ok(Some(email.to_string()))
}

fn check_appointment_time(
    row: &RawRow,
    row_number: usize,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, ValidationError> {
    let raw = row.get("appointmenttime");
    if raw.trim().is_empty() {
        return Err(ValidationError::new(
            row_number,
            ErrorField::AppointmentTime,
            raw,
            "La fecha/hora de la cita es requerida",
        ));
    }

    parse_appointment_time(raw, offset).ok_or_else(|| {
        ValidationError::new(
            row_number,
            ErrorField::AppointmentTime,
            raw,
            format!(
                "Fecha/hora inválida. Formato esperado: ISO 8601 (YYYY-MM-DDTHH:mm:ss). Recibido: {}",
                raw
            ),
        )
    })
}

fn check_consent(row: &RawRow, row_number: usize) -> Result<ConsentGranted, ValidationError> {
    let raw = row.get("hasconsent");
    if ConsentValue::from(raw).is_granted() {
        return Ok(ConsentGranted);
    }
    Err(ValidationError::new(
        row_number,
        ErrorField::HasConsent,
        raw,
        "El paciente debe dar consentimiento (hasConsent debe ser true)",
    ))
}

/// Runs every field check on one row and either builds the patient or
/// returns all of the row's errors, in column order.
pub fn validate_row(
    row: &RawRow,
    row_number: usize,
    options: &ImportOptions,
) -> Result<ParsedPatient, Vec<ValidationError>> {
    let checks = (
        check_name(row, row_number),
        check_phone(row, row_number),
        check_email(row, row_number),
        check_appointment_time(row, row_number, options.utc_offset),
        check_consent(row, row_number),
    );

    match checks {
        (Ok(name), Ok(phone), Ok(email), Ok(appointment_time), Ok(has_consent)) => {
            let appointment_type = row.get("appointmenttype").trim();
            Ok(ParsedPatient {
                name,
                phone,
                email,
                appointment_time,
                appointment_type: (!appointment_type.is_empty())
                    .then(|| appointment_type.to_string()),
                has_consent,
            })
        }
        (name, phone, email, appointment_time, consent) => Err([
            name.err(),
            phone.err(),
            email.err(),
            appointment_time.err(),
            consent.err(),
        ]
        .into_iter()
        .flatten()
        .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            cells
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
        )
    }

    fn valid_cells() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", "Juan Perez"),
            ("phone", "0987654321"),
            ("email", "juan@x.com"),
            ("appointmentTime", "2026-01-20T10:00:00"),
            ("appointmentType", "Consulta"),
            ("hasConsent", "true"),
        ]
    }

    fn with(field: &'static str, value: &'static str) -> RawRow {
        let cells: Vec<_> = valid_cells()
            .into_iter()
            .map(|(k, v)| if k == field { (k, value) } else { (k, v) })
            .collect();
        row(&cells)
    }

    fn fields(errors: &[ValidationError]) -> Vec<ErrorField> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_valid_row_is_normalized() {
        let patient = validate_row(&row(&valid_cells()), 1, &ImportOptions::default()).unwrap();
        assert_eq!(patient.name, "Juan Perez");
        assert_eq!(patient.phone, "+593987654321");
        assert_eq!(patient.email.as_deref(), Some("juan@x.com"));
        assert_eq!(patient.appointment_type.as_deref(), Some("Consulta"));
        assert_eq!(
            patient.appointment_time,
            Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_optional_columns_may_be_missing() {
        let patient = validate_row(
            &row(&[
                ("name", "Ana"),
                ("phone", "987654321"),
                ("appointmentTime", "2026-01-20"),
                ("hasConsent", "si"),
            ]),
            1,
            &ImportOptions::default(),
        )
        .unwrap();
        assert_eq!(patient.email, None);
        assert_eq!(patient.appointment_type, None);
    }

    #[test]
    fn test_missing_required_columns_are_field_errors() {
        let errors = validate_row(&RawRow::default(), 3, &ImportOptions::default()).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec![
                ErrorField::Name,
                ErrorField::Phone,
                ErrorField::AppointmentTime,
                ErrorField::HasConsent
            ]
        );
        assert!(errors.iter().all(|e| e.row == 3 && e.value.is_empty()));
    }

    #[test]
    fn test_withheld_consent_is_an_error() {
        let errors = validate_row(&with("hasConsent", "false"), 1, &ImportOptions::default())
            .unwrap_err();
        assert_eq!(fields(&errors), vec![ErrorField::HasConsent]);
        assert_eq!(errors[0].value, "false");
    }

    #[test]
    fn test_consent_cell_spellings() {
        for granted in ["Sí", " YES ", "1"] {
            assert!(validate_row(&with("hasConsent", granted), 1, &ImportOptions::default()).is_ok());
        }
        for withheld in ["0", "no", ""] {
            let errors = validate_row(&with("hasConsent", withheld), 1, &ImportOptions::default())
                .unwrap_err();
            assert_eq!(fields(&errors), vec![ErrorField::HasConsent]);
        }
    }

    #[test]
    fn test_all_errors_of_a_row_are_collected() {
        let cells = vec![
            ("name", "Juan"),
            ("phone", "12345"),
            ("email", "not-an-email"),
            ("appointmentTime", "2026-01-20T10:00:00"),
            ("hasConsent", "yes"),
        ];
        let errors = validate_row(&row(&cells), 2, &ImportOptions::default()).unwrap_err();
        assert_eq!(fields(&errors), vec![ErrorField::Phone, ErrorField::Email]);
        assert!(errors[0].message.contains("Recibido: 12345"));
        assert_eq!(errors[1].value, "not-an-email");
    }

    #[test]
    fn test_bad_date_quotes_raw_value() {
        let errors = validate_row(
            &with("appointmentTime", "20/01/2026"),
            1,
            &ImportOptions::default(),
        )
        .unwrap_err();
        assert_eq!(fields(&errors), vec![ErrorField::AppointmentTime]);
        assert!(errors[0].message.ends_with("Recibido: 20/01/2026"));
    }

    #[test]
    fn test_blank_name_is_an_error() {
        let errors = validate_row(&with("name", "   "), 1, &ImportOptions::default()).unwrap_err();
        assert_eq!(fields(&errors), vec![ErrorField::Name]);
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("juan@x.com"));
        assert!(is_valid_email(" a.b@c.d.ec "));
        assert!(!is_valid_email("juan@x"));
        assert!(!is_valid_email("juan@@x.com"));
        assert!(!is_valid_email("ju an@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn test_appointment_time_formats() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let expected = Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap();
        for raw in [
            "2026-01-20T10:00:00",
            "2026-01-20T10:00",
            "2026-01-20 10:00:00",
            "2026-01-20T10:00:00.000",
            "2026-01-20T10:00:00Z",
            "2026-01-20T05:00:00-05:00",
        ] {
            assert_eq!(parse_appointment_time(raw, utc), Some(expected), "{}", raw);
        }
        assert_eq!(
            parse_appointment_time("2026-01-20", utc).map(|t| t.hour()),
            Some(0)
        );
        assert_eq!(parse_appointment_time("2026-02-30T10:00:00", utc), None);
        assert_eq!(parse_appointment_time("mañana", utc), None);
    }

    #[test]
    fn test_naive_times_use_configured_offset() {
        let guayaquil = FixedOffset::west_opt(5 * 3600).unwrap();
        let parsed = parse_appointment_time("2026-01-20T10:00:00", guayaquil).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 20, 15, 0, 0).unwrap());
    }
}
