//! Ecuadorian mobile numbers.
//!
//! Accepted spellings of the same number:
//!   0987654321     -> +593987654321
//!   593987654321   -> +593987654321
//!   +593987654321  -> +593987654321
//!   987654321      -> +593987654321

use regex::Regex;
use std::sync::LazyLock;

pub const COUNTRY_PREFIX: &str = "+593";

static CANONICAL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+593[0-9]{9}$").unwrap());

pub fn is_canonical_ecuador_phone(phone: &str) -> bool {
    CANONICAL_PHONE.is_match(phone.trim())
}

/// Rewrites a phone number into `+593XXXXXXXXX` when its shape allows.
/// Anything else comes back as given (trimmed) and fails
/// [`is_canonical_ecuador_phone`].
pub fn normalize_ecuador_phone(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let len = cleaned.chars().count();

    if cleaned.starts_with(COUNTRY_PREFIX) && len == 13 {
        return cleaned;
    }

    if cleaned.starts_with("593") && len == 12 {
        return format!("+{}", cleaned);
    }

    if let Some(local) = cleaned.strip_prefix('0') {
        if len == 10 {
            return format!("{}{}", COUNTRY_PREFIX, local);
        }
    }

    if len == 9 {
        return format!("{}{}", COUNTRY_PREFIX, cleaned);
    }

    phone.trim().to_string()
}
