use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
pub enum FileUploadStatus {
    Pending,
    Uploading,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct FileUploadProgress {
    pub name: String,
    /// 0..=100
    pub percent: u8,
    pub status: FileUploadStatus,
}

/// Progress of every attachment of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct UploadProgress {
    pub upload_id: String,
    pub files: Vec<FileUploadProgress>,
    pub completed: bool,
}

impl UploadProgress {
    pub fn overall_percent(&self) -> u8 {
        if self.files.is_empty() {
            return if self.completed { 100 } else { 0 };
        }
        let sum: u32 = self.files.iter().map(|f| f.percent as u32).sum();
        (sum / self.files.len() as u32) as u8
    }
}
