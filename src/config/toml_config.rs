use crate::core::ConfigProvider;
use crate::domain::model::{ImportOptions, ImportTarget};
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{
    parse_delimiter, parse_utc_offset, validate_non_empty_string, validate_path, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub import: ImportSection,
    pub target: TargetSection,
    pub input: InputSection,
    pub output: OutputSection,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSection {
    pub delimiter: Option<String>,
    pub skip_header: Option<bool>,
    pub utc_offset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSection {
    pub workspace_id: String,
    pub campaign_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSection {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: String,
    pub dry_run: Option<bool>,
    /// Also write the full parse result as JSON next to the patients.
    pub write_report: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// `${VAR}` is replaced by the environment value; unknown variables are
    /// left in place so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn try_import_options(&self) -> Result<ImportOptions> {
        let defaults = ImportOptions::default();
        Ok(ImportOptions {
            skip_header: self.import.skip_header.unwrap_or(defaults.skip_header),
            delimiter: match &self.import.delimiter {
                Some(d) => parse_delimiter("import.delimiter", d)?,
                None => defaults.delimiter,
            },
            utc_offset: match &self.import.utc_offset {
                Some(offset) => parse_utc_offset("import.utc_offset", offset)?,
                None => defaults.utc_offset,
            },
        })
    }

    pub fn input_path(&self) -> &str {
        &self.input.path
    }

    pub fn is_dry_run(&self) -> bool {
        self.output.dry_run.unwrap_or(false)
    }

    pub fn writes_report(&self) -> bool {
        self.output.write_report.unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .as_ref()
            .and_then(|l| l.format)
            .unwrap_or(LogFormat::Text)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("input.path", &self.input.path)?;
        validate_path("output.path", &self.output.path)?;
        validate_non_empty_string("target.workspace_id", &self.target.workspace_id)?;
        validate_non_empty_string("target.campaign_id", &self.target.campaign_id)?;

        for (field, value) in [
            ("target.workspace_id", &self.target.workspace_id),
            ("target.campaign_id", &self.target.campaign_id),
        ] {
            if ENV_VAR.is_match(value) {
                return Err(ImportError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.clone(),
                    reason: "Environment variable is not set".to_string(),
                });
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level()) {
            return Err(ImportError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.log_level().to_string(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        self.try_import_options()?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn import_options(&self) -> ImportOptions {
        self.try_import_options().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn target(&self) -> ImportTarget {
        ImportTarget::new(
            self.target.workspace_id.clone(),
            self.target.campaign_id.clone(),
        )
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
