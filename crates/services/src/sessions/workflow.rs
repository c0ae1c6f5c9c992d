use std::sync::Arc;

use storage::BankSource;
use tiku_core::model::{PoolKind, QuestionBank, QuestionId, Submission};
use tracing::info;

use crate::Clock;
use crate::error::SessionError;

use super::plan::{DEFAULT_SESSION_SIZE, SelectionPolicy};
use super::service::{AnswerOutcome, QuizSession, SessionState};

/// Orchestrates session start, answering and retries over a loaded bank.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    session_size: usize,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, bank: Arc<QuestionBank>) -> Self {
        Self {
            clock,
            bank,
            session_size: DEFAULT_SESSION_SIZE,
        }
    }

    /// Load the bank from `source` and build the service over it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the bank cannot be loaded.
    pub async fn load(clock: Clock, source: &dyn BankSource) -> Result<Self, SessionError> {
        let bank = source.load_bank().await?;
        Ok(Self::new(clock, Arc::new(bank)))
    }

    /// Size of random practice sessions. Zero falls back to the default.
    #[must_use]
    pub fn with_session_size(mut self, size: usize) -> Self {
        self.session_size = if size == 0 { DEFAULT_SESSION_SIZE } else { size };
        self
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn session_size(&self) -> usize {
        self.session_size
    }

    /// Start a session drawn by `policy`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` or `SessionError::EmptySelection`
    /// when nothing can be drawn.
    pub fn start(&self, policy: SelectionPolicy) -> Result<QuizSession, SessionError> {
        let plan = policy.draw(&self.bank)?;
        let session = QuizSession::new(plan, self.clock.now())?;
        info!(kind = %session.kind(), total = session.total(), "session started");
        Ok(session)
    }

    /// Start a random practice session over one pool.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if the pool has no questions.
    pub fn start_practice(&self, kind: PoolKind) -> Result<QuizSession, SessionError> {
        self.start(SelectionPolicy::Random {
            kind,
            size: self.session_size,
        })
    }

    /// Start a custom review over the chosen lookup entries.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySelection` for no ids and
    /// `SessionError::EmptyPool` when none of them exists.
    pub fn start_custom(
        &self,
        ids: impl IntoIterator<Item = QuestionId>,
    ) -> Result<QuizSession, SessionError> {
        self.start(SelectionPolicy::explicit(PoolKind::Lookup, ids))
    }

    /// Start over with a fresh draw under the policy of `session`.
    ///
    /// # Errors
    ///
    /// Same as [`SessionLoopService::start`].
    pub fn restart(&self, session: &QuizSession) -> Result<QuizSession, SessionError> {
        self.start(session.policy().clone())
    }

    /// Grade a submission for the current question of `session`.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::submit_answer`].
    pub fn submit(
        &self,
        session: &mut QuizSession,
        submission: &Submission,
    ) -> Result<AnswerOutcome, SessionError> {
        session.submit_answer(submission)
    }

    /// Move `session` to its next question, stamping completion with the clock.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::advance`].
    pub fn advance(&self, session: &mut QuizSession) -> Result<SessionState, SessionError> {
        let state = session.advance(self.clock.now())?;
        if state == SessionState::Complete {
            info!(kind = %session.kind(), score = session.score(), total = session.total(), "session complete");
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiku_core::time::{fixed_clock, fixed_now};

    fn service(judges: usize) -> SessionLoopService {
        let mut builder = QuestionBank::builder();
        for i in 0..judges {
            builder.push_judge(&format!("Q{i}"), Some("对".into()));
        }
        builder.push_lookup("什么是货币", Some("一般等价物".into()));
        SessionLoopService::new(fixed_clock(), Arc::new(builder.build()))
    }

    #[test]
    fn practice_respects_session_size() {
        let svc = service(20).with_session_size(5);
        let session = svc.start_practice(PoolKind::Judge).unwrap();
        assert_eq!(session.total(), 5);
        assert_eq!(session.started_at(), fixed_now());

        let svc = svc.with_session_size(0);
        assert_eq!(svc.session_size(), DEFAULT_SESSION_SIZE);
    }

    #[test]
    fn practice_on_missing_pool_fails() {
        let err = service(2).start_practice(PoolKind::Choice).unwrap_err();
        assert!(matches!(err, SessionError::EmptyPool));
    }

    #[test]
    fn restart_draws_a_fresh_session_with_same_policy() {
        let svc = service(3);
        let mut session = svc.start_practice(PoolKind::Judge).unwrap();
        svc.submit(&mut session, &Submission::text("对")).unwrap();
        svc.advance(&mut session).unwrap();

        let again = svc.restart(&session).unwrap();
        assert_eq!(again.policy(), session.policy());
        assert_eq!(again.index(), 0);
        assert_eq!(again.score(), 0);
        assert_eq!(again.total(), 3);
    }

    #[test]
    fn custom_review_uses_lookup_entries() {
        let svc = service(1);
        let id = svc.bank().lookup_entries()[0].id();
        let mut session = svc.start_custom([id]).unwrap();
        assert_eq!(session.kind(), PoolKind::Lookup);

        let outcome = svc.submit(&mut session, &Submission::text("等价物")).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(svc.advance(&mut session).unwrap(), SessionState::Complete);
        assert_eq!(session.summary().unwrap().score(), 0);
    }

    #[test]
    fn custom_review_with_no_ids_fails() {
        let err = service(1).start_custom(Vec::<QuestionId>::new()).unwrap_err();
        assert!(matches!(err, SessionError::EmptySelection));
    }
}
