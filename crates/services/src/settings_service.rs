use std::sync::Arc;

use storage::SettingsRepository;
use tiku_core::model::{AppSettings, AppSettingsDraft};
use tracing::info;

use crate::error::SettingsServiceError;

/// Environment variable holding the explanation API key.
pub const API_KEY_ENV: &str = "SILICON_API_KEY";

/// Loads and saves explanation settings; the API key lives only in memory.
#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// API key from [`API_KEY_ENV`], if set and non-blank.
    #[must_use]
    pub fn api_key_from_env() -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Load persisted settings (or defaults) carrying `api_key`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load_with_api_key(
        &self,
        api_key: Option<String>,
    ) -> Result<AppSettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?.unwrap_or_default();
        Ok(settings.with_api_key(api_key))
    }

    /// Validate and persist new settings. The key is kept on the returned
    /// value but never written.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::MissingApiKey` for a blank key, and
    /// validation or persistence failures.
    pub async fn save(&self, draft: AppSettingsDraft) -> Result<AppSettings, SettingsServiceError> {
        let settings = draft.validate()?;
        if !settings.has_api_key() {
            return Err(SettingsServiceError::MissingApiKey);
        }
        self.repo.save_settings(&settings).await?;
        info!(model = settings.model(), "settings saved");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryRepository;
    use tiku_core::model::{AppSettingsError, DEFAULT_MODEL};

    fn service() -> SettingsService {
        SettingsService::new(Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn load_defaults_when_nothing_saved() {
        let settings = service().load_with_api_key(None).await.unwrap();
        assert_eq!(settings.model(), DEFAULT_MODEL);
        assert!(!settings.has_api_key());
    }

    #[tokio::test]
    async fn save_requires_api_key() {
        let err = service()
            .save(AppSettingsDraft {
                api_key: Some("  ".into()),
                ..AppSettingsDraft::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsServiceError::MissingApiKey));
    }

    #[tokio::test]
    async fn save_rejects_bad_url() {
        let err = service()
            .save(AppSettingsDraft {
                api_key: Some("sk".into()),
                api_url: Some("not a url".into()),
                ..AppSettingsDraft::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsServiceError::Settings(AppSettingsError::InvalidApiUrl)
        ));
    }

    #[tokio::test]
    async fn saved_settings_reload_with_runtime_key_only() {
        let svc = service();
        let saved = svc
            .save(AppSettingsDraft {
                api_key: Some("sk-1".into()),
                model: Some("Qwen/Qwen2-7B-Instruct".into()),
                enable_reasoning: true,
                ..AppSettingsDraft::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.api_key(), Some("sk-1"));

        let reloaded = svc.load_with_api_key(None).await.unwrap();
        assert_eq!(reloaded.model(), "Qwen/Qwen2-7B-Instruct");
        assert!(reloaded.enable_reasoning());
        assert!(!reloaded.has_api_key());

        let keyed = svc.load_with_api_key(Some("sk-2".into())).await.unwrap();
        assert_eq!(keyed.api_key(), Some("sk-2"));
    }
}
