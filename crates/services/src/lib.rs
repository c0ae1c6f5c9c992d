#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod explanation_service;
pub mod lookup_service;
pub mod sessions;
pub mod settings_service;

pub use tiku_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, ExplanationError, SessionError, SettingsServiceError};
pub use explanation_service::{ExplanationService, NO_REFERENCE_ANSWER};
pub use lookup_service::{LookupHit, LookupService};
pub use settings_service::{API_KEY_ENV, SettingsService};

pub use sessions::{
    AnswerOutcome, QuizSession, SelectionPolicy, SessionLoopService, SessionPlan,
    SessionProgress, SessionState,
};
