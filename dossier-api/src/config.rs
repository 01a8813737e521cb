use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding the dossier documents. Defaults to the local data dir.
    pub database_path: Option<PathBuf>,
    /// Root directory of uploaded attachments. Defaults to the local data dir.
    pub objects_dir: Option<PathBuf>,
    /// Prefix of attachment URLs handed back to clients
    pub public_base_url: String,
    /// Largest accepted attachment; bigger files are refused one by one
    pub max_upload_bytes: u64,
    /// Largest accepted form data part
    pub max_meta_bytes: u64,
    /// Largest accepted submission body, every part included
    pub max_request_bytes: u64,
    pub upload_concurrency: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            objects_dir: None,
            public_base_url: "http://127.0.0.1:8080/files".to_string(),
            max_upload_bytes: budget::MAX_ATTACHMENT_BYTES,
            max_meta_bytes: 1024 * 1024,
            max_request_bytes: 100 * 1024 * 1024,
            upload_concurrency: 4,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_minutes: i64,
    pub advisors: Vec<AdvisorAccount>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: 8 * 60,
            advisors: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdvisorAccount {
    pub email: String,
    /// Salted password hash (`dossier-api --hash-password <pw>`)
    pub password_hash: String,
}

const CONFIG_HEADER: &str = "\
# Dossier intake API configuration
#
# Add advisor accounts under [auth]:
# [[auth.advisors]]
# email = \"conseiller@example.org\"
# password_hash = \"<output of dossier-api --hash-password>\"

";

impl ApiConfig {
    /// Load from the default location, writing a default file on first run.
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();
        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            let body = toml::to_string_pretty(&ApiConfig::default()).map_err(|e| {
                ConfigError::Message(format!("Failed to serialize default config: {e}"))
            })?;
            std::fs::write(config_path, format!("{CONFIG_HEADER}{body}")).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.to_path_buf()))
            .build()?;

        builder.try_deserialize()
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("dossier").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_and_reads_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("api.toml");

        let config = ApiConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.auth.advisors.is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "0.0.0.0"
port = 9000

[[auth.advisors]]
email = "a@example.org"
password_hash = "sha256$10000$salt$abc"
"#,
        )
        .unwrap();

        let config = ApiConfig::load_from(&path).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.advisors.len(), 1);
        assert_eq!(config.auth.session_ttl_minutes, 480);
        assert_eq!(config.storage.upload_concurrency, 4);
        assert_eq!(config.storage.max_meta_bytes, 1024 * 1024);
        assert_eq!(config.storage.max_request_bytes, 100 * 1024 * 1024);
    }
}
