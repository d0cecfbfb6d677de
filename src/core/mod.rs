pub mod aggregator;
pub mod consent;
pub mod engine;
pub mod phone;
pub mod tokenizer;
pub mod validator;

pub use crate::domain::model::{
    ImportOptions, ImportSummary, ImportTarget, ParseResult, ParsedPatient, RawRow,
    ValidationError,
};
pub use crate::domain::ports::{ConfigProvider, PatientSink, Storage};
pub use crate::utils::error::Result;
