use crate::database::dossiers as db;
use crate::database::AsyncDbConnection;
use crate::jobs::upload_tracker::{percent, UploadTracker};
use crate::storage::{attachment_key, ObjectStore};
use budget::WizardError;
use futures::StreamExt;
use shared_types::{Attachment, DeleteDossierResponse, Dossier, DossierSubmission, SubmitDossierResponse};
use std::sync::Arc;
use thiserror::Error;

/// Attachment received with a submission, not stored yet
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Invalid(#[from] WizardError),
    #[error("failed to save dossier: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Result of the best-effort upload loop
#[derive(Debug, Default)]
pub struct UploadReport {
    pub attachments: Vec<Attachment>,
    pub failed_files: Vec<String>,
}

/// Owns the write paths of a dossier: submission (uploads + document) and
/// deletion (document + attachments).
pub struct DossierManager {
    db_conn: AsyncDbConnection,
    store: Arc<dyn ObjectStore>,
    tracker: UploadTracker,
    concurrency: usize,
}

impl DossierManager {
    pub fn new(
        db_conn: AsyncDbConnection,
        store: Arc<dyn ObjectStore>,
        tracker: UploadTracker,
        concurrency: usize,
    ) -> Self {
        Self {
            db_conn,
            store,
            tracker,
            concurrency: concurrency.max(1),
        }
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    pub fn tracker(&self) -> &UploadTracker {
        &self.tracker
    }

    /// Upload every file concurrently. A failed upload is logged and left
    /// out; it never aborts the others.
    pub async fn upload_files(&self, upload_id: &str, files: Vec<PendingFile>) -> UploadReport {
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        self.tracker.start(upload_id, &names);

        let timestamp = chrono::Utc::now().timestamp_millis();
        let results: Vec<(String, Option<Attachment>)> = futures::stream::iter(
            files.into_iter().enumerate(),
        )
        .map(|(index, file)| {
            let store = self.store.clone();
            let tracker = self.tracker.clone();
            let upload_id = upload_id.to_string();
            async move {
                let key = attachment_key(timestamp, index, &file.name);
                tracker.set_percent(&upload_id, index, 0);

                let on_progress = |done: u64, total: u64| {
                    tracker.set_percent(&upload_id, index, percent(done, total));
                };

                match store.put(&key, &file.bytes, &on_progress).await {
                    Ok(()) => {
                        tracker.finish_file(&upload_id, index, true);
                        let attachment = Attachment {
                            name: file.name.clone(),
                            url: store.url(&key),
                            path: key,
                        };
                        (file.name, Some(attachment))
                    }
                    Err(e) => {
                        tracing::warn!("Upload of {} failed, continuing without it: {:#}", file.name, e);
                        tracker.finish_file(&upload_id, index, false);
                        (file.name, None)
                    }
                }
            }
        })
        .buffered(self.concurrency)
        .collect()
        .await;

        let mut report = UploadReport::default();
        for (name, attachment) in results {
            match attachment {
                Some(a) => report.attachments.push(a),
                None => report.failed_files.push(name),
            }
        }
        report
    }

    /// Upload attachments, then write the composite document.
    pub async fn submit(
        &self,
        upload_id: &str,
        submission: DossierSubmission,
        files: Vec<PendingFile>,
    ) -> Result<SubmitDossierResponse, SubmissionError> {
        budget::validate_submission(&submission)?;

        let file_count = files.len();
        let report = self.upload_files(upload_id, files).await;
        let totals = budget::submission_totals(&submission);

        let dossier = Dossier {
            contact: submission.contact,
            consents: submission.consents,
            income: submission.income,
            charges: submission.charges,
            insurance: submission.insurance,
            taxes: submission.taxes,
            credits: submission.credits,
            attachments: report.attachments.clone(),
            created_at: chrono::Utc::now().timestamp(),
            totals,
        };

        let result = db::insert_dossier(self.db_conn.clone(), &dossier).await;
        self.tracker.complete(upload_id);
        let id = match result {
            Ok(id) => id,
            Err(e) => {
                self.discard_attachments(&report.attachments).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            "Dossier {} saved: {}/{} attachments stored, residual {:.2}",
            id,
            report.attachments.len(),
            file_count,
            totals.residual
        );

        Ok(SubmitDossierResponse {
            id,
            attachments: report.attachments,
            failed_files: report.failed_files,
            rejected_files: Vec::new(),
            totals,
        })
    }

    /// Remove objects uploaded for a dossier that was never written
    async fn discard_attachments(&self, attachments: &[Attachment]) {
        for attachment in attachments {
            if let Err(e) = self.store.delete(&attachment.path).await {
                tracing::warn!("Orphaned attachment {} left in storage: {:#}", attachment.path, e);
            }
        }
    }

    /// Delete the document, then its attachments (best effort).
    /// Returns `None` when the dossier does not exist.
    pub async fn delete(&self, id: &str) -> anyhow::Result<Option<DeleteDossierResponse>> {
        let detail = match db::get_dossier(self.db_conn.clone(), id).await? {
            Some(detail) => detail,
            None => return Ok(None),
        };

        if !db::delete_dossier(self.db_conn.clone(), id).await? {
            return Ok(None);
        }

        let mut deleted_attachments = 0;
        let mut failed_attachments = Vec::new();
        for attachment in &detail.dossier.attachments {
            match self.store.delete(&attachment.path).await {
                Ok(()) => deleted_attachments += 1,
                Err(e) => {
                    tracing::warn!("Failed to delete attachment {}: {:#}", attachment.path, e);
                    failed_attachments.push(attachment.name.clone());
                }
            }
        }

        tracing::info!(
            "Dossier {} deleted ({} attachments removed, {} failed)",
            id,
            deleted_attachments,
            failed_attachments.len()
        );

        Ok(Some(DeleteDossierResponse {
            id: id.to_string(),
            deleted_attachments,
            failed_attachments,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::storage::{LocalObjectStore, ProgressFn};
    use async_trait::async_trait;
    use shared_types::{Amount, FileUploadStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps a local store and fails every key containing "broken"
    struct FlakyStore {
        inner: LocalObjectStore,
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
        async fn put(&self, key: &str, bytes: &[u8], progress: &ProgressFn<'_>) -> anyhow::Result<()> {
            if key.contains("broken") {
                progress(0, bytes.len() as u64);
                anyhow::bail!("simulated network error");
            }
            self.inner.put(key, bytes, progress).await
        }

        async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> anyhow::Result<()> {
            self.inner.delete(key).await
        }

        fn url(&self, key: &str) -> String {
            self.inner.url(key)
        }
    }

    /// Counts puts running at the same time
    #[derive(Default)]
    struct CountingStore {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn put(&self, _key: &str, bytes: &[u8], progress: &ProgressFn<'_>) -> anyhow::Result<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            progress(bytes.len() as u64, bytes.len() as u64);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }

        async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("no object {}", key)
        }

        async fn delete(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }

        fn url(&self, key: &str) -> String {
            format!("http://files/{}", key)
        }
    }

    fn setup() -> (tempfile::TempDir, DossierManager, AsyncDbConnection) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("db.sqlite")).unwrap();
        let store = FlakyStore {
            inner: LocalObjectStore::new(dir.path().join("objects"), "http://files").unwrap(),
        };
        let conn = db.async_connection.clone();
        let manager = DossierManager::new(conn.clone(), Arc::new(store), UploadTracker::new(), 2);
        (dir, manager, conn)
    }

    fn submission() -> DossierSubmission {
        let mut s = DossierSubmission::default();
        s.consents.processing = true;
        s.contact.first_name = "Léa".to_string();
        s.contact.last_name = "Martin".to_string();
        s.income.salaries = Amount(1500.0);
        s.charges.housing.rent = Amount(500.0);
        s
    }

    fn file(name: &str) -> PendingFile {
        PendingFile {
            name: name.to_string(),
            bytes: name.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_submit_tolerates_failed_upload() {
        let (_dir, manager, conn) = setup();

        let response = manager
            .submit(
                "up-1",
                submission(),
                vec![file("avis.pdf"), file("broken.pdf"), file("releve.pdf")],
            )
            .await
            .unwrap();

        assert_eq!(response.attachments.len(), 2);
        assert_eq!(response.attachments[0].name, "avis.pdf");
        assert_eq!(response.attachments[1].name, "releve.pdf");
        assert_eq!(response.failed_files, vec!["broken.pdf".to_string()]);
        assert_eq!(response.totals.residual, 1000.0);

        let stored = db::get_dossier(conn, &response.id).await.unwrap().unwrap();
        assert_eq!(stored.dossier.attachments, response.attachments);

        let progress = manager.tracker().get("up-1").unwrap();
        assert!(progress.completed);
        assert_eq!(progress.files[0].status, FileUploadStatus::Done);
        assert_eq!(progress.files[1].status, FileUploadStatus::Failed);
        assert_eq!(progress.files[2].percent, 100);
    }

    #[tokio::test]
    async fn test_submit_requires_consent() {
        let (_dir, manager, _conn) = setup();
        let mut s = submission();
        s.consents.processing = false;

        let err = manager.submit("up-2", s, vec![]).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Invalid(WizardError::ConsentRequired)));
    }

    #[tokio::test]
    async fn test_delete_removes_attachments() {
        let (_dir, manager, conn) = setup();
        let response = manager
            .submit("up-3", submission(), vec![file("a.pdf"), file("b.pdf")])
            .await
            .unwrap();

        // Remove one object behind the manager's back
        manager
            .store()
            .delete(&response.attachments[1].path)
            .await
            .unwrap();

        let deleted = manager.delete(&response.id).await.unwrap().unwrap();
        assert_eq!(deleted.deleted_attachments, 1);
        assert_eq!(deleted.failed_attachments, vec!["b.pdf".to_string()]);

        assert!(db::get_dossier(conn, &response.id).await.unwrap().is_none());
        assert!(manager
            .store()
            .get(&response.attachments[0].path)
            .await
            .is_err());
        assert!(manager.delete(&response.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_uploads_respect_concurrency_limit() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("db.sqlite")).unwrap();
        let store = Arc::new(CountingStore::default());
        let manager = DossierManager::new(
            db.async_connection.clone(),
            store.clone(),
            UploadTracker::new(),
            2,
        );

        let files = (0..6).map(|i| file(&format!("piece-{i}.pdf"))).collect();
        let report = manager.upload_files("up-4", files).await;

        assert_eq!(report.attachments.len(), 6);
        assert_eq!(report.attachments[5].name, "piece-5.pdf");
        assert_eq!(store.max_in_flight.load(Ordering::SeqCst), 2);
        assert_eq!(store.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_removes_uploaded_attachments() {
        let (dir, manager, conn) = setup();
        conn.lock()
            .await
            .unwrap()
            .execute_batch("DROP TABLE dossiers")
            .unwrap();

        let err = manager
            .submit("up-5", submission(), vec![file("avis.pdf"), file("releve.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Storage(_)));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("objects/dossiers"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty(), "objects left behind: {leftovers:?}");
        assert!(manager.tracker().get("up-5").unwrap().completed);
    }
}
