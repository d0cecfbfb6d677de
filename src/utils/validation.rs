use crate::utils::error::{ImportError, Result};
use chrono::FixedOffset;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// A single ASCII character other than the quote or a line break.
/// `\t` and `tab` name the tab character.
pub fn parse_delimiter(field_name: &str, value: &str) -> Result<u8> {
    let candidate = match value {
        "\\t" | "tab" => "\t",
        other => other,
    };

    let mut chars = candidate.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && !matches!(c, '"' | '\n' | '\r') => Ok(c as u8),
        _ => Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Delimiter must be a single ASCII character other than quote or newline"
                .to_string(),
        }),
    }
}

/// Parses `Z`, `UTC`, `+HH:MM` or `-HH:MM`.
pub fn parse_utc_offset(field_name: &str, value: &str) -> Result<FixedOffset> {
    let invalid = |reason: &str| ImportError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| invalid("Offset out of range"));
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid("Offset must look like +HH:MM or -HH:MM")),
    };

    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| invalid("Offset must look like +HH:MM or -HH:MM"))?;
    let hours: i32 = hours
        .parse()
        .map_err(|_| invalid("Offset hours are not a number"))?;
    let minutes: i32 = minutes
        .parse()
        .map_err(|_| invalid("Offset minutes are not a number"))?;
    validate_range(field_name, hours, 0, 14)?;
    validate_range(field_name, minutes, 0, 59)?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| invalid("Offset out of range"))
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("delimiter", ",").unwrap(), b',');
        assert_eq!(parse_delimiter("delimiter", ";").unwrap(), b';');
        assert_eq!(parse_delimiter("delimiter", "\\t").unwrap(), b'\t');
        assert!(parse_delimiter("delimiter", "").is_err());
        assert!(parse_delimiter("delimiter", ";;").is_err());
        assert!(parse_delimiter("delimiter", "\"").is_err());
        assert!(parse_delimiter("delimiter", "é").is_err());
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("utc_offset", "Z").unwrap().local_minus_utc(), 0);
        assert_eq!(
            parse_utc_offset("utc_offset", "-05:00").unwrap().local_minus_utc(),
            -5 * 3600
        );
        assert_eq!(
            parse_utc_offset("utc_offset", "+05:30").unwrap().local_minus_utc(),
            5 * 3600 + 30 * 60
        );
        assert!(parse_utc_offset("utc_offset", "05:00").is_err());
        assert!(parse_utc_offset("utc_offset", "+25:00").is_err());
        assert!(parse_utc_offset("utc_offset", "+aa:00").is_err());
    }

    #[test]
    fn test_validate_path_and_strings() {
        assert!(validate_path("output.path", "./out").is_ok());
        assert!(validate_path("output.path", "").is_err());
        assert!(validate_non_empty_string("target.campaign_id", "   ").is_err());
    }
}
