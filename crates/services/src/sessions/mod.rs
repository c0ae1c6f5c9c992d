mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{
    DEFAULT_SESSION_SIZE, SelectionPolicy, SessionPlan, sample_random, sample_random_with,
    select_explicit,
};
pub use progress::SessionProgress;
pub use service::{AnswerOutcome, QuizSession, SessionState};
pub use workflow::SessionLoopService;
