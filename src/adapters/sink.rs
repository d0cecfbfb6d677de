use crate::domain::model::{ImportTarget, ParsedPatient};
use crate::domain::ports::{PatientSink, Storage};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PatientRecord<'a> {
    workspace_id: &'a str,
    campaign_id: &'a str,
    #[serde(flatten)]
    patient: &'a ParsedPatient,
}

/// Persists accepted patients as a JSON array under
/// `<workspace>/<campaign>/patients.json`. Each import appends to the
/// patients already stored for the campaign.
pub struct StorageSink<S: Storage> {
    storage: S,
}

impl<S: Storage> StorageSink<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn patients_path(target: &ImportTarget) -> String {
        format!("{}/{}/patients.json", target.workspace_id, target.campaign_id)
    }

    async fn stored_records(&self, path: &str) -> Result<Vec<serde_json::Value>> {
        match self.storage.read_file(path).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(ImportError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<S: Storage> PatientSink for StorageSink<S> {
    async fn insert_patients(
        &self,
        target: &ImportTarget,
        patients: &[ParsedPatient],
    ) -> Result<usize> {
        let path = Self::patients_path(target);
        let mut records = self.stored_records(&path).await?;
        let existing = records.len();

        for patient in patients {
            records.push(serde_json::to_value(PatientRecord {
                workspace_id: &target.workspace_id,
                campaign_id: &target.campaign_id,
                patient,
            })?);
        }

        let json = serde_json::to_vec_pretty(&records)?;
        tracing::debug!(
            "Appending {} patients to {} ({} already stored, {} bytes)",
            patients.len(),
            path,
            existing,
            json.len()
        );
        self.storage.write_file(&path, &json).await?;

        Ok(patients.len())
    }
}
