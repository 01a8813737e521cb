use crate::config::StorageConfig;
use std::path::PathBuf;

fn data_dir() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;
    Ok(data_dir.join("dossier"))
}

/// Returns the path of the dossier database
///
/// Uses `storage.database_path` when configured, otherwise:
///
/// - **macOS**: `~/Library/Application Support/dossier/dossiers.db`
/// - **Linux**: `~/.local/share/dossier/dossiers.db`
/// - **Windows**: `%LOCALAPPDATA%\dossier\dossiers.db`
pub fn get_db_path(storage: &StorageConfig) -> anyhow::Result<PathBuf> {
    match &storage.database_path {
        Some(path) => Ok(path.clone()),
        None => Ok(data_dir()?.join("dossiers.db")),
    }
}

/// Root directory of the attachment object store
pub fn get_objects_dir(storage: &StorageConfig) -> anyhow::Result<PathBuf> {
    match &storage.objects_dir {
        Some(path) => Ok(path.clone()),
        None => Ok(data_dir()?.join("objects")),
    }
}

/// Open (and migrate) the database
pub fn initialize_database(
    storage: &StorageConfig,
) -> anyhow::Result<std::sync::Arc<crate::database::Database>> {
    let db_path = get_db_path(storage)?;
    let db = crate::database::Database::new(&db_path)?;
    Ok(std::sync::Arc::new(db))
}
