use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tiku_core::model::AppSettings;
use tracing::{debug, warn};

use crate::repository::{SettingsRepository, StorageError};

/// Settings stored as a pretty-printed JSON file.
///
/// A missing or corrupt file reads as "no settings" so callers fall back to
/// defaults. The API key is never written.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: &io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsStore {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file");
                return Ok(None);
            }
            Err(err) => return Err(self.io_error(&err)),
        };

        match serde_json::from_str::<AppSettings>(&raw) {
            Ok(settings) => Ok(Some(settings)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "settings file unreadable, using defaults");
                Ok(None)
            }
        }
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.io_error(&err))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|err| self.io_error(&err))?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiku_core::model::{AppSettingsDraft, DEFAULT_API_URL};

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("config.json"));
        assert!(store.get_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saves_without_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("nested/config.json"));
        let settings = AppSettingsDraft {
            api_key: Some("sk-secret".into()),
            model: Some("Qwen/Qwen2-7B-Instruct".into()),
            enable_reasoning: true,
            ..AppSettingsDraft::default()
        }
        .validate()
        .unwrap();

        store.save_settings(&settings).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("sk-secret"));
        let loaded = store.get_settings().await.unwrap().unwrap();
        assert_eq!(loaded.model(), "Qwen/Qwen2-7B-Instruct");
        assert!(loaded.enable_reasoning());
        assert_eq!(loaded.api_url(), DEFAULT_API_URL);
        assert!(loaded.api_key().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonSettingsStore::new(path);
        assert!(store.get_settings().await.unwrap().is_none());
    }
}
