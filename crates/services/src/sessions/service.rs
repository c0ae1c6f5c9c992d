use std::fmt;

use chrono::{DateTime, Utc};
use tiku_core::grading;
use tiku_core::model::{PoolKind, Question, QuestionId, SessionSummary, Submission};
use tracing::debug;

use crate::error::SessionError;

use super::plan::{SelectionPolicy, SessionPlan};
use super::progress::SessionProgress;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle state of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A current question exists.
    Active,
    /// Every question has been passed; only `summary` is valid.
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Active => f.write_str("active"),
            SessionState::Complete => f.write_str("complete"),
        }
    }
}

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Result of grading one submission within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub is_correct: bool,
    /// Submission as the grading strategy normalized it.
    pub submitted: String,
    /// Stored reference answer.
    pub reference: String,
    /// True only for the first grading of the current question; later
    /// re-submissions are graded but leave the score and results untouched.
    pub counted: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session over an ordered question list.
///
/// Submitting grades the current question without moving on; `advance` is a
/// separate step so a caller can show the result first. Only the first
/// submission per question affects the score.
pub struct QuizSession {
    policy: SelectionPolicy,
    questions: Vec<Question>,
    index: usize,
    score: usize,
    current_graded: bool,
    results: Vec<AnswerOutcome>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a session from a drawn plan.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if the plan holds no questions.
    pub fn new(plan: SessionPlan, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        if plan.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        Ok(Self {
            policy: plan.policy,
            questions: plan.questions,
            index: 0,
            score: 0,
            current_graded: false,
            results: Vec::new(),
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn kind(&self) -> PoolKind {
        self.policy.kind()
    }

    /// The policy this session was drawn with.
    #[must_use]
    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// First gradings of every answered question, in answer order.
    #[must_use]
    pub fn results(&self) -> &[AnswerOutcome] {
        &self.results
    }

    /// Answered questions whose first grading was wrong.
    pub fn missed(&self) -> impl Iterator<Item = &AnswerOutcome> + '_ {
        self.results.iter().filter(|r| !r.is_correct)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.index >= self.questions.len() {
            SessionState::Complete
        } else {
            SessionState::Active
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state() == SessionState::Complete
    }

    /// Whether the current question has already been graded once.
    #[must_use]
    pub fn is_current_graded(&self) -> bool {
        self.current_graded
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total(),
            position: (self.index + 1).min(self.total()),
            answered: self.results.len(),
            remaining: self.total().saturating_sub(self.index),
            score: self.score,
            is_complete: self.is_complete(),
        }
    }

    fn require_active(&self, operation: &'static str) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Active => Ok(()),
            state => Err(SessionError::InvalidStateTransition { operation, state }),
        }
    }

    /// The question waiting for an answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStateTransition` once the session is complete.
    pub fn current_question(&self) -> Result<&Question, SessionError> {
        self.require_active("read the current question of")?;
        Ok(&self.questions[self.index])
    }

    /// Grade a submission for the current question without advancing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingAnswer` for a blank submission,
    /// `SessionError::SubmissionMismatch` when the submission cannot answer the
    /// question, and `SessionError::InvalidStateTransition` once complete.
    /// None of these change the session.
    pub fn submit_answer(&mut self, submission: &Submission) -> Result<AnswerOutcome, SessionError> {
        self.require_active("submit an answer to")?;
        let question = &self.questions[self.index];
        let graded = grading::grade(question, submission)?;

        let counted = !self.current_graded;
        let outcome = AnswerOutcome {
            question_id: question.id(),
            is_correct: graded.is_correct,
            submitted: graded.submitted,
            reference: graded.reference,
            counted,
        };

        if counted {
            if outcome.is_correct && self.kind().is_scored() {
                self.score += 1;
            }
            self.current_graded = true;
            self.results.push(outcome.clone());
        }
        debug!(
            question = %outcome.question_id,
            correct = outcome.is_correct,
            counted,
            score = self.score,
            "answer graded"
        );
        Ok(outcome)
    }

    /// Move past the current question, graded or not.
    ///
    /// `at` should come from the services layer clock; it stamps completion.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStateTransition` if the session is already complete.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<SessionState, SessionError> {
        self.require_active("advance")?;
        self.index += 1;
        self.current_graded = false;
        if self.index == self.questions.len() {
            self.completed_at = Some(at);
        }
        let state = self.state();
        debug!(index = self.index, %state, "session advanced");
        Ok(state)
    }

    /// Final tally of a completed session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStateTransition` while the session is active.
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        let completed_at = match (self.state(), self.completed_at) {
            (SessionState::Complete, Some(at)) => at,
            (state, _) => {
                return Err(SessionError::InvalidStateTransition {
                    operation: "summarize",
                    state,
                });
            }
        };
        Ok(SessionSummary::new(
            self.kind(),
            self.total(),
            self.score,
            self.started_at,
            completed_at,
        )?)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("kind", &self.kind())
            .field("questions_len", &self.questions.len())
            .field("index", &self.index)
            .field("score", &self.score)
            .field("results_len", &self.results.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tiku_core::model::{ChoiceKey, ChoiceOptions, Verdict};
    use tiku_core::time::fixed_now;

    fn judge(id: u64, answer: &str) -> Question {
        Question::true_false(QuestionId::new(id), format!("Q{id}"), Some(answer.into()))
    }

    fn session_of(questions: Vec<Question>) -> QuizSession {
        let kind = questions[0].pool_kind();
        let ids: Vec<_> = questions.iter().map(Question::id).collect();
        let plan = SessionPlan {
            policy: SelectionPolicy::explicit(kind, ids),
            questions,
        };
        QuizSession::new(plan, fixed_now()).unwrap()
    }

    #[test]
    fn empty_plan_is_rejected() {
        let plan = SessionPlan {
            policy: SelectionPolicy::random(PoolKind::Judge),
            questions: Vec::new(),
        };
        let err = QuizSession::new(plan, fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::EmptyPool));
    }

    #[test]
    fn three_questions_complete_after_three_rounds() {
        let mut session = session_of(vec![judge(1, "对"), judge(2, "错"), judge(3, "对")]);

        for _ in 0..3 {
            assert_eq!(session.state(), SessionState::Active);
            session.submit_answer(&Submission::from(Verdict::True)).unwrap();
            session.advance(fixed_now()).unwrap();
        }

        assert!(session.is_complete());
        let summary = session.summary().unwrap();
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.score(), 2);
        assert_eq!(summary.completed_at(), fixed_now());

        let err = session.advance(fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidStateTransition {
                state: SessionState::Complete,
                ..
            }
        ));
    }

    #[test]
    fn operations_in_wrong_state_are_rejected() {
        let mut session = session_of(vec![judge(1, "对")]);
        assert!(matches!(
            session.summary().unwrap_err(),
            SessionError::InvalidStateTransition {
                state: SessionState::Active,
                ..
            }
        ));

        session.advance(fixed_now()).unwrap();
        assert!(session.current_question().is_err());
        assert!(matches!(
            session.submit_answer(&Submission::text("对")).unwrap_err(),
            SessionError::InvalidStateTransition { .. }
        ));
        assert_eq!(session.summary().unwrap().score(), 0);
    }

    #[test]
    fn current_question_is_stable_until_advance() {
        let mut session = session_of(vec![judge(1, "对"), judge(2, "对")]);
        let first = session.current_question().unwrap().id();
        assert_eq!(session.current_question().unwrap().id(), first);

        session.submit_answer(&Submission::text("对")).unwrap();
        assert_eq!(session.current_question().unwrap().id(), first);

        session.advance(fixed_now()).unwrap();
        assert_ne!(session.current_question().unwrap().id(), first);
    }

    #[test]
    fn resubmission_does_not_double_count() {
        let mut session = session_of(vec![judge(1, "对"), judge(2, "对")]);

        let first = session.submit_answer(&Submission::text("对")).unwrap();
        assert!(first.is_correct && first.counted);
        let again = session.submit_answer(&Submission::text("对")).unwrap();
        assert!(again.is_correct);
        assert!(!again.counted);

        assert_eq!(session.score(), 1);
        assert_eq!(session.index(), 0);
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn resubmission_after_wrong_answer_cannot_earn_the_point() {
        let mut session = session_of(vec![judge(1, "对")]);
        assert!(!session.submit_answer(&Submission::text("错")).unwrap().is_correct);
        let retry = session.submit_answer(&Submission::text("对")).unwrap();
        assert!(retry.is_correct && !retry.counted);
        assert_eq!(session.score(), 0);
        assert_eq!(session.missed().count(), 1);
    }

    #[test]
    fn missing_answers_leave_session_untouched() {
        let multi = Question::choice(
            QuestionId::new(1),
            "Q",
            ChoiceOptions::default(),
            Some("AC".into()),
            Some("多选题"),
        );
        let fill = Question::fill_blank(QuestionId::new(2), "Q", Some("x".into()));
        let mut session = session_of(vec![multi, fill]);

        let err = session
            .submit_answer(&Submission::Letters(BTreeSet::new()))
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingAnswer));
        assert_eq!((session.index(), session.score()), (0, 0));
        assert!(!session.is_current_graded());

        session
            .submit_answer(&Submission::letters([ChoiceKey::A, ChoiceKey::C]))
            .unwrap();
        session.advance(fixed_now()).unwrap();

        let err = session.submit_answer(&Submission::text("   ")).unwrap_err();
        assert!(matches!(err, SessionError::MissingAnswer));
        let err = session.submit_answer(&Submission::Blank).unwrap_err();
        assert!(matches!(err, SessionError::MissingAnswer));
        assert_eq!((session.index(), session.score()), (1, 1));
    }

    #[test]
    fn punctuation_only_multi_choice_answer_is_not_graded() {
        let unanswered = Question::choice(
            QuestionId::new(1),
            "Q",
            ChoiceOptions::default(),
            None,
            Some("多选题"),
        );
        let mut session = session_of(vec![unanswered]);

        for raw in [",", ", ,"] {
            let err = session.submit_answer(&Submission::text(raw)).unwrap_err();
            assert!(matches!(err, SessionError::MissingAnswer));
        }
        assert!(!session.is_current_graded());
        assert_eq!(session.score(), 0);
        assert!(session.results().is_empty());
    }

    #[test]
    fn mismatched_submission_is_reported() {
        let mut session = session_of(vec![judge(1, "对")]);
        let err = session
            .submit_answer(&Submission::letters([ChoiceKey::A]))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::SubmissionMismatch {
                pool: PoolKind::Judge,
                shape: "letters"
            }
        ));
        assert!(!session.is_current_graded());
    }

    #[test]
    fn lookup_sessions_are_not_scored() {
        let entry = Question::lookup(QuestionId::new(1), "Q", Some("central bank".into()));
        let mut session = session_of(vec![entry]);
        let outcome = session.submit_answer(&Submission::text("Bank")).unwrap();
        assert!(outcome.is_correct && outcome.counted);
        assert_eq!(session.score(), 0);
        assert_eq!(session.kind(), PoolKind::Lookup);
    }

    #[test]
    fn skipping_a_question_counts_it_unanswered() {
        let mut session = session_of(vec![judge(1, "对"), judge(2, "对")]);
        session.advance(fixed_now()).unwrap();
        session.submit_answer(&Submission::text("对")).unwrap();
        session.advance(fixed_now()).unwrap();

        let progress = session.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 0);
        assert!(progress.is_complete);
        assert_eq!(session.summary().unwrap().score(), 1);
    }
}
