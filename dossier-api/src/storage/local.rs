use super::{ObjectStore, ProgressFn};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

const CHUNK_SIZE: usize = 64 * 1024;

/// Object store backed by a directory on local disk
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create object directory {}", root.display()))?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.split('/').any(|segment| segment.is_empty()) {
            anyhow::bail!("Invalid object key: {:?}", key);
        }
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            anyhow::bail!("Invalid object key: {:?}", key);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: &[u8], progress: &ProgressFn<'_>) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let result = match write_chunks(&partial, bytes, progress).await {
            Ok(()) => tokio::fs::rename(&partial, &path)
                .await
                .with_context(|| format!("Failed to move {} into place", partial.display())),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Could not remove {}: {}", partial.display(), cleanup);
                }
            }
            return Err(e);
        }

        tracing::debug!("Stored object {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read object {}", key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to delete object {}", key))
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

async fn write_chunks(path: &Path, bytes: &[u8], progress: &ProgressFn<'_>) -> Result<()> {
    let total = bytes.len() as u64;
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;

    progress(0, total);
    let mut written = 0u64;
    for chunk in bytes.chunks(CHUNK_SIZE) {
        file.write_all(chunk).await?;
        written += chunk.len() as u64;
        progress(written, total);
    }
    file.flush().await?;
    Ok(())
}
