pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{ImportOptions, ImportTarget};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    parse_delimiter, parse_utc_offset, validate_non_empty_string, validate_path, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "patient-import")]
#[command(about = "Validate a patient CSV and import the accepted rows into a campaign")]
pub struct CliConfig {
    /// CSV file to import, relative to the current directory
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = ",")]
    pub delimiter: String,

    #[arg(long, help = "The file has no header line; columns are read in the standard order")]
    pub no_header: bool,

    #[arg(long, default_value = "Z", help = "Offset for appointment times without one, e.g. -05:00")]
    pub utc_offset: String,

    #[arg(long, default_value = "default")]
    pub workspace_id: String,

    #[arg(long)]
    pub campaign_id: String,

    #[arg(long, help = "Only validate, do not write patients")]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn try_import_options(&self) -> Result<ImportOptions> {
        Ok(ImportOptions {
            skip_header: !self.no_header,
            delimiter: parse_delimiter("delimiter", &self.delimiter)?,
            utc_offset: parse_utc_offset("utc_offset", &self.utc_offset)?,
        })
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn import_options(&self) -> ImportOptions {
        // validate() has already rejected anything unparsable
        self.try_import_options().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn target(&self) -> ImportTarget {
        ImportTarget::new(self.workspace_id.clone(), self.campaign_id.clone())
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_string("workspace_id", &self.workspace_id)?;
        validate_non_empty_string("campaign_id", &self.campaign_id)?;
        self.try_import_options()?;
        Ok(())
    }
}
