mod app_settings;
mod bank;
mod ids;
mod question;
mod session;
mod submission;

pub use app_settings::{
    AppSettings, AppSettingsDraft, AppSettingsError, DEFAULT_API_URL, DEFAULT_MODEL, KNOWN_MODELS,
};
pub use bank::{QuestionBank, QuestionBankBuilder};
pub use ids::{ParseIdError, QuestionId};
pub use question::{
    ChoiceKey, ChoiceOptions, DEFAULT_CHOICE_LABEL, MULTI_CHOICE_MARKER, PoolKind, Question,
    QuestionBody, UnknownPoolKind, Verdict, clean_cell,
};
pub use session::{PASS_ACCURACY, SessionSummary, SessionSummaryError};
pub use submission::Submission;
