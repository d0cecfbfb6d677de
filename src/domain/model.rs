use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One data line of the upload, keyed by lower-cased header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    /// Value of a column, looked up case-insensitively. Absent columns read
    /// as the empty string.
    pub fn get(&self, column: &str) -> &str {
        self.cells
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(column))
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(column))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Marker for a consent flag that can only ever be `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConsentGranted;

impl Serialize for ConsentGranted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(true)
    }
}

impl<'de> Deserialize<'de> for ConsentGranted {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if bool::deserialize(deserializer)? {
            Ok(ConsentGranted)
        } else {
            Err(serde::de::Error::custom(
                "a patient record requires hasConsent = true",
            ))
        }
    }
}

impl From<ConsentGranted> for bool {
    fn from(_: ConsentGranted) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPatient {
    pub name: String,
    /// Always `+593` followed by nine digits.
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub appointment_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<String>,
    pub has_consent: ConsentGranted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "appointmentTime")]
    AppointmentTime,
    #[serde(rename = "hasConsent")]
    HasConsent,
    /// The document as a whole could not be read.
    #[serde(rename = "file")]
    File,
}

impl ErrorField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorField::Name => "name",
            ErrorField::Phone => "phone",
            ErrorField::Email => "email",
            ErrorField::AppointmentTime => "appointmentTime",
            ErrorField::HasConsent => "hasConsent",
            ErrorField::File => "file",
        }
    }
}

impl fmt::Display for ErrorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Data-row ordinal starting at 1; 0 for document-level failures.
    pub row: usize,
    pub field: ErrorField,
    pub value: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        row: usize,
        field: ErrorField,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row,
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} [{}]: {}", self.row, self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub patients: Vec<ParsedPatient>,
    pub errors: Vec<ValidationError>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
}

impl ParseResult {
    /// Every row failed, or the file itself could not be read.
    pub fn is_rejected(&self) -> bool {
        !self.errors.is_empty() && self.valid_rows == 0
    }

    /// Process exit code for a dry run: `1` when the import would be
    /// rejected, the same code a real rejected import exits with.
    pub fn dry_run_exit_code(&self) -> i32 {
        if self.is_rejected() {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// First non-empty line names the columns.
    pub skip_header: bool,
    pub delimiter: u8,
    /// Applied to appointment times written without an offset.
    pub utc_offset: FixedOffset,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_header: true,
            delimiter: b',',
            utc_offset: Utc.fix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTarget {
    pub workspace_id: String,
    pub campaign_id: String,
}

impl ImportTarget {
    pub fn new(workspace_id: impl Into<String>, campaign_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            campaign_id: campaign_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub patients_created: usize,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub errors: Vec<ValidationError>,
}
