use serde::{Deserialize, Serialize};

/// Spellings that grant consent, compared after trimming and lower-casing.
pub const CONSENT_TOKENS: [&str; 5] = ["true", "1", "yes", "si", "sí"];

pub fn consent_granted(raw: &str) -> bool {
    let token = raw.trim().to_lowercase();
    CONSENT_TOKENS.contains(&token.as_str())
}

/// A consent flag as it may arrive: a real boolean from JSON, or text from a
/// CSV cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsentValue {
    Flag(bool),
    Text(String),
}

impl ConsentValue {
    pub fn is_granted(&self) -> bool {
        match self {
            ConsentValue::Flag(flag) => *flag,
            ConsentValue::Text(text) => consent_granted(text),
        }
    }
}

impl From<&str> for ConsentValue {
    fn from(value: &str) -> Self {
        ConsentValue::Text(value.to_string())
    }
}

impl From<bool> for ConsentValue {
    fn from(value: bool) -> Self {
        ConsentValue::Flag(value)
    }
}
