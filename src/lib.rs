pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::sink::StorageSink;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::aggregator::{parse_patients_csv, parse_patients_csv_bytes};
pub use core::engine::ImportEngine;
pub use domain::model::{
    ErrorField, ImportOptions, ImportSummary, ImportTarget, ParseResult, ParsedPatient,
    ValidationError,
};
pub use utils::error::{ImportError, Result};
