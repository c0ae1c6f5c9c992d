use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tiku_core::model::{AppSettings, QuestionBank};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("i/o error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Supplies a question bank snapshot.
#[async_trait]
pub trait BankSource: Send + Sync {
    /// Load every pool of the bank.
    ///
    /// Sources tolerate missing tables and malformed rows; only failures that
    /// leave no usable snapshot are errors.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the source cannot be read at all.
    async fn load_bank(&self) -> Result<QuestionBank, StorageError>;
}

/// Repository contract for explanation-service settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch stored settings, `None` when nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError>;

    /// Persist settings. Implementations never store the API key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be written.
    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    bank: Arc<Mutex<QuestionBank>>,
    settings: Arc<Mutex<Option<AppSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bank(bank: QuestionBank) -> Self {
        Self {
            bank: Arc::new(Mutex::new(bank)),
            settings: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the bank returned by later loads.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn replace_bank(&self, bank: QuestionBank) -> Result<(), StorageError> {
        let mut guard = self
            .bank
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = bank;
        Ok(())
    }
}

#[async_trait]
impl BankSource for InMemoryRepository {
    async fn load_bank(&self) -> Result<QuestionBank, StorageError> {
        let guard = self
            .bank
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(settings.clone().with_api_key(None));
        Ok(())
    }
}

/// Aggregates the bank source and settings store behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub bank: Arc<dyn BankSource>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(bank: QuestionBank) -> Self {
        let repo = InMemoryRepository::with_bank(bank);
        let source: Arc<dyn BankSource> = Arc::new(repo.clone());
        let settings: Arc<dyn SettingsRepository> = Arc::new(repo);
        Self {
            bank: source,
            settings,
        }
    }
}
