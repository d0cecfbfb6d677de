use crate::domain::model::{ImportOptions, ImportTarget, ParsedPatient};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn import_options(&self) -> ImportOptions;
    fn output_path(&self) -> &str;
    fn target(&self) -> ImportTarget;
}

/// Where accepted patients go. Returns how many were persisted.
#[async_trait]
pub trait PatientSink: Send + Sync {
    async fn insert_patients(
        &self,
        target: &ImportTarget,
        patients: &[ParsedPatient],
    ) -> Result<usize>;
}
