//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use tiku_core::grading::GradingError;
use tiku_core::model::{AppSettingsError, PoolKind, SessionSummaryError};

use crate::sessions::SessionState;

/// Errors emitted by `ExplanationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExplanationError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("explanation service returned an empty response")]
    EmptyResponse,
    #[error("explanation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by session selection and the session engine.
///
/// None of them is fatal: the session that raised one stays usable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for this session")]
    EmptyPool,
    #[error("no questions were selected")]
    EmptySelection,
    #[error("no answer was submitted")]
    MissingAnswer,
    #[error("cannot {operation} a session that is {state}")]
    InvalidStateTransition {
        operation: &'static str,
        state: SessionState,
    },
    #[error("a {shape} answer does not fit a {pool} question")]
    SubmissionMismatch { pool: PoolKind, shape: &'static str },
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<GradingError> for SessionError {
    fn from(err: GradingError) -> Self {
        match err {
            GradingError::MissingAnswer => SessionError::MissingAnswer,
            GradingError::Mismatch { pool, shape } => SessionError::SubmissionMismatch { pool, shape },
        }
    }
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error("API key must not be empty")]
    MissingApiKey,
    #[error(transparent)]
    Settings(#[from] AppSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
}
