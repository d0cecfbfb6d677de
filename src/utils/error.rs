use crate::domain::model::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Import rejected: {invalid_rows} of {total_rows} rows invalid, {} errors", .errors.len())]
    Rejected {
        errors: Vec<ValidationError>,
        total_rows: usize,
        valid_rows: usize,
        invalid_rows: usize,
    },

    #[error("Persistence error: {message}")]
    PersistenceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::InvalidConfigValueError { .. }
            | ImportError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ImportError::Rejected { .. } => ErrorCategory::Input,
            ImportError::IoError(_) | ImportError::PersistenceError { .. } => {
                ErrorCategory::Storage
            }
            ImportError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ImportError::Rejected {
                errors, total_rows, ..
            } => format!(
                "No valid patients found in {} rows ({} errors)",
                total_rows,
                errors.len()
            ),
            ImportError::IoError(e) => format!("Could not read or write a file: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command-line flags or the TOML configuration file"
            }
            ErrorCategory::Input => {
                "Fix the listed rows (phone +593XXXXXXXXX, ISO 8601 appointment time, hasConsent=true) and upload again"
            }
            ErrorCategory::Storage => "Check that the output path exists and is writable",
            ErrorCategory::Data => "Re-run with --verbose and inspect the offending records",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
