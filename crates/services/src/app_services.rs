use std::path::{Path, PathBuf};
use std::sync::Arc;

use storage::Storage;
use tiku_core::model::{AppSettings, QuestionBank};

use crate::Clock;
use crate::error::AppServicesError;
use crate::explanation_service::ExplanationService;
use crate::lookup_service::LookupService;
use crate::sessions::SessionLoopService;
use crate::settings_service::SettingsService;

/// Assembles app-facing services over one loaded bank.
#[derive(Clone)]
pub struct AppServices {
    bank: Arc<QuestionBank>,
    session_loop: Arc<SessionLoopService>,
    lookup: Arc<LookupService>,
    settings: Arc<SettingsService>,
    explanation: Arc<ExplanationService>,
}

impl AppServices {
    /// Load the bank and settings from `storage`, taking the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the bank or settings cannot be loaded.
    pub async fn new(storage: &Storage, clock: Clock) -> Result<Self, AppServicesError> {
        Self::with_api_key(storage, clock, SettingsService::api_key_from_env()).await
    }

    /// Like [`AppServices::new`] with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the bank or settings cannot be loaded.
    pub async fn with_api_key(
        storage: &Storage,
        clock: Clock,
        api_key: Option<String>,
    ) -> Result<Self, AppServicesError> {
        let bank = Arc::new(storage.bank.load_bank().await?);
        let settings = Arc::new(SettingsService::new(Arc::clone(&storage.settings)));
        let app_settings = settings.load_with_api_key(api_key).await?;

        Ok(Self {
            session_loop: Arc::new(SessionLoopService::new(clock, Arc::clone(&bank))),
            lookup: Arc::new(LookupService::new(Arc::clone(&bank))),
            explanation: Arc::new(ExplanationService::new(app_settings)),
            settings,
            bank,
        })
    }

    /// Build services over CSV tables in `data_dir` and a JSON settings file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the bank or settings cannot be loaded.
    pub async fn from_files(
        data_dir: impl AsRef<Path>,
        config_path: Option<PathBuf>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::files(data_dir, config_path);
        Self::new(&storage, clock).await
    }

    /// Random session size used by practice sessions.
    #[must_use]
    pub fn with_session_size(mut self, size: usize) -> Self {
        let session_loop = self.session_loop.as_ref().clone().with_session_size(size);
        self.session_loop = Arc::new(session_loop);
        self
    }

    /// Swap in new settings after they were saved.
    pub fn apply_settings(&mut self, settings: AppSettings) {
        self.explanation = Arc::new(ExplanationService::new(settings));
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn lookup(&self) -> Arc<LookupService> {
        Arc::clone(&self.lookup)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn explanation(&self) -> Arc<ExplanationService> {
        Arc::clone(&self.explanation)
    }
}
