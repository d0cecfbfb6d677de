use crate::core::aggregator::{parse_patients_csv, parse_patients_csv_bytes};
use crate::domain::model::{ImportOptions, ImportSummary, ImportTarget, ParseResult};
use crate::domain::ports::PatientSink;
use crate::utils::error::{ImportError, Result};

/// Upload-side contract around the parser: reject when nothing usable came
/// out of the document, otherwise persist the accepted patients and report
/// the rest.
pub struct ImportEngine<S: PatientSink> {
    sink: S,
}

impl<S: PatientSink> ImportEngine<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Parses without persisting anything.
    pub fn preview(&self, content: &str, options: &ImportOptions) -> ParseResult {
        parse_patients_csv(content, options)
    }

    pub async fn import(
        &self,
        target: &ImportTarget,
        content: &str,
        options: &ImportOptions,
    ) -> Result<ImportSummary> {
        self.commit(target, parse_patients_csv(content, options)).await
    }

    pub async fn import_bytes(
        &self,
        target: &ImportTarget,
        content: &[u8],
        options: &ImportOptions,
    ) -> Result<ImportSummary> {
        self.commit(target, parse_patients_csv_bytes(content, options))
            .await
    }

    async fn commit(&self, target: &ImportTarget, result: ParseResult) -> Result<ImportSummary> {
        tracing::info!(
            "Parsed CSV for campaign {}: {} rows, {} valid, {} invalid",
            target.campaign_id,
            result.total_rows,
            result.valid_rows,
            result.invalid_rows
        );

        if result.is_rejected() {
            tracing::warn!(
                "Import rejected for campaign {} with {} errors",
                target.campaign_id,
                result.errors.len()
            );
            return Err(ImportError::Rejected {
                errors: result.errors,
                total_rows: result.total_rows,
                valid_rows: result.valid_rows,
                invalid_rows: result.invalid_rows,
            });
        }

        let patients_created = self.sink.insert_patients(target, &result.patients).await?;
        tracing::info!(
            "Created {} patients in campaign {} (workspace {})",
            patients_created,
            target.campaign_id,
            target.workspace_id
        );

        Ok(ImportSummary {
            patients_created,
            total_rows: result.total_rows,
            valid_rows: result.valid_rows,
            invalid_rows: result.invalid_rows,
            errors: result.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ErrorField, ParsedPatient};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingSink {
        inserted: Arc<Mutex<Vec<(ImportTarget, ParsedPatient)>>>,
        fail: bool,
    }

    #[async_trait]
    impl PatientSink for RecordingSink {
        async fn insert_patients(
            &self,
            target: &ImportTarget,
            patients: &[ParsedPatient],
        ) -> Result<usize> {
            if self.fail {
                return Err(ImportError::PersistenceError {
                    message: "database unavailable".to_string(),
                });
            }
            let mut inserted = self.inserted.lock().await;
            inserted.extend(patients.iter().map(|p| (target.clone(), p.clone())));
            Ok(patients.len())
        }
    }

    const CSV: &str = "name,phone,email,appointmentTime,hasConsent\n\
                       Juan Perez,0987654321,juan@x.com,2026-01-20T10:00:00,true\n\
                       Maria,0988888888,maria@,2026-01-20T11:30:00,true\n";

    fn target() -> ImportTarget {
        ImportTarget::new("ws-1", "camp-1")
    }

    #[tokio::test]
    async fn test_partial_import_persists_valid_rows_and_reports_errors() {
        let sink = RecordingSink::default();
        let engine = ImportEngine::new(sink.clone());

        let summary = engine
            .import(&target(), CSV, &ImportOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.patients_created, 1);
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.invalid_rows, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].field, ErrorField::Email);

        let inserted = sink.inserted.lock().await;
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].0.campaign_id, "camp-1");
        assert_eq!(inserted[0].1.phone, "+593987654321");
    }

    #[tokio::test]
    async fn test_all_invalid_rows_reject_the_import() {
        let sink = RecordingSink::default();
        let engine = ImportEngine::new(sink.clone());
        let csv = "name,phone,appointmentTime,hasConsent\nAna,0987654321,2026-01-20,no\n";

        let err = engine
            .import(&target(), csv, &ImportOptions::default())
            .await
            .unwrap_err();

        match err {
            ImportError::Rejected {
                errors,
                total_rows,
                valid_rows,
                invalid_rows,
            } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, ErrorField::HasConsent);
                assert_eq!((total_rows, valid_rows, invalid_rows), (1, 0, 1));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(sink.inserted.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_file_rejects_the_import() {
        let engine = ImportEngine::new(RecordingSink::default());
        let err = engine
            .import_bytes(&target(), b"name\n\"open", &ImportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Rejected { total_rows: 0, .. }));
    }

    #[tokio::test]
    async fn test_sink_failure_propagates() {
        let engine = ImportEngine::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let err = engine
            .import(&target(), CSV, &ImportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::PersistenceError { .. }));
    }

    #[test]
    fn test_preview_does_not_touch_the_sink() {
        let sink = RecordingSink::default();
        let engine = ImportEngine::new(sink.clone());
        let result = engine.preview(CSV, &ImportOptions::default());
        assert_eq!(result.valid_rows, 1);
        assert!(tokio_test::block_on(sink.inserted.lock()).is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_imports_nothing() {
        let engine = ImportEngine::new(RecordingSink::default());
        let summary = engine
            .import(&target(), "name,phone\n", &ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.patients_created, 0);
        assert!(summary.errors.is_empty());
    }
}
