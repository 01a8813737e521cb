use chrono::{DateTime, Duration, Utc};
use shared_types::{FileUploadProgress, FileUploadStatus, UploadProgress};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// How long finished (or abandoned) uploads stay visible to pollers
const RETENTION_MINUTES: i64 = 60;

struct TrackedUpload {
    progress: UploadProgress,
    updated_at: DateTime<Utc>,
}

impl TrackedUpload {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.updated_at >= Duration::minutes(RETENTION_MINUTES)
    }
}

/// Per-file upload progress of in-flight submissions, polled by the form.
///
/// Updated from synchronous store callbacks, hence the std mutex.
#[derive(Clone, Default)]
pub struct UploadTracker {
    uploads: Arc<Mutex<HashMap<String, TrackedUpload>>>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, TrackedUpload>> {
        self.uploads.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn start(&self, upload_id: &str, file_names: &[String]) {
        let now = Utc::now();
        let mut uploads = self.guard();
        uploads.retain(|_, u| !u.is_expired(now));
        uploads.insert(
            upload_id.to_string(),
            TrackedUpload {
                progress: UploadProgress {
                    upload_id: upload_id.to_string(),
                    files: file_names
                        .iter()
                        .map(|name| FileUploadProgress {
                            name: name.clone(),
                            percent: 0,
                            status: FileUploadStatus::Pending,
                        })
                        .collect(),
                    completed: false,
                },
                updated_at: now,
            },
        );
    }

    fn update(&self, upload_id: &str, f: impl FnOnce(&mut UploadProgress)) {
        let now = Utc::now();
        let mut uploads = self.guard();
        let expired = match uploads.get_mut(upload_id) {
            Some(upload) if !upload.is_expired(now) => {
                f(&mut upload.progress);
                upload.updated_at = now;
                false
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            uploads.remove(upload_id);
        }
    }

    pub fn set_percent(&self, upload_id: &str, index: usize, percent: u8) {
        self.update(upload_id, |progress| {
            if let Some(file) = progress.files.get_mut(index) {
                file.percent = percent.min(100);
                file.status = FileUploadStatus::Uploading;
            }
        });
    }

    pub fn finish_file(&self, upload_id: &str, index: usize, succeeded: bool) {
        self.update(upload_id, |progress| {
            if let Some(file) = progress.files.get_mut(index) {
                if succeeded {
                    file.percent = 100;
                    file.status = FileUploadStatus::Done;
                } else {
                    file.status = FileUploadStatus::Failed;
                }
            }
        });
    }

    pub fn complete(&self, upload_id: &str) {
        self.update(upload_id, |progress| progress.completed = true);
    }

    pub fn get(&self, upload_id: &str) -> Option<UploadProgress> {
        let now = Utc::now();
        let mut uploads = self.guard();
        if uploads.get(upload_id)?.is_expired(now) {
            uploads.remove(upload_id);
            return None;
        }
        uploads.get(upload_id).map(|u| u.progress.clone())
    }
}

/// Rounded percentage; an empty file counts as fully written
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) as f64 / total as f64) * 100.0).round() as u8
}
