pub mod local;

use anyhow::Result;
use async_trait::async_trait;

pub use local::LocalObjectStore;

/// Receives (bytes written, total bytes) while an object is stored
pub type ProgressFn<'a> = dyn Fn(u64, u64) + Send + Sync + 'a;

/// Where attachment bytes live. Keys are relative, `/`-separated paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], progress: &ProgressFn<'_>) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Public URL of a stored object
    fn url(&self, key: &str) -> String;
}

/// Keep letters, digits, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "fichier".to_string()
    } else {
        cleaned
    }
}

/// Object key of the `index`-th attachment of a submission
pub fn attachment_key(timestamp_millis: i64, index: usize, file_name: &str) -> String {
    format!(
        "dossiers/{}_{}_{}",
        timestamp_millis,
        index,
        sanitize_file_name(file_name)
    )
}
