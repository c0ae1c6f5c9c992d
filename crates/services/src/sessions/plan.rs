use rand::seq::SliceRandom;
use rand::{Rng, rng};
use std::collections::HashSet;

use tiku_core::model::{PoolKind, Question, QuestionBank, QuestionId};

use crate::error::SessionError;

/// Questions drawn for a random practice session unless configured otherwise.
pub const DEFAULT_SESSION_SIZE: usize = 15;

/// Draws `min(n, pool.len())` distinct questions uniformly, in random order.
///
/// An empty pool yields an empty draw; callers report that as `EmptyPool`.
#[must_use]
pub fn sample_random(pool: &[Question], n: usize) -> Vec<Question> {
    sample_random_with(pool, n, &mut rng())
}

/// [`sample_random`] with a caller-supplied generator.
pub fn sample_random_with<R: Rng + ?Sized>(pool: &[Question], n: usize, rng: &mut R) -> Vec<Question> {
    let mut picked = pool.to_vec();
    picked.as_mut_slice().shuffle(rng);
    picked.truncate(n);
    picked
}

/// Questions of `pool` whose id is in `chosen`, in bank order.
///
/// Unknown ids are ignored, so the result may be empty.
///
/// # Errors
///
/// Returns `SessionError::EmptySelection` if `chosen` is empty.
pub fn select_explicit(pool: &[Question], chosen: &[QuestionId]) -> Result<Vec<Question>, SessionError> {
    if chosen.is_empty() {
        return Err(SessionError::EmptySelection);
    }
    let wanted: HashSet<QuestionId> = chosen.iter().copied().collect();
    Ok(pool
        .iter()
        .filter(|q| wanted.contains(&q.id()))
        .cloned()
        .collect())
}

/// How the questions of a session are chosen. Kept by the session so a retry
/// can draw again the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    Random { kind: PoolKind, size: usize },
    Explicit { kind: PoolKind, ids: Vec<QuestionId> },
}

impl SelectionPolicy {
    #[must_use]
    pub fn random(kind: PoolKind) -> Self {
        Self::Random {
            kind,
            size: DEFAULT_SESSION_SIZE,
        }
    }

    #[must_use]
    pub fn explicit(kind: PoolKind, ids: impl IntoIterator<Item = QuestionId>) -> Self {
        Self::Explicit {
            kind,
            ids: ids.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PoolKind {
        match self {
            Self::Random { kind, .. } | Self::Explicit { kind, .. } => *kind,
        }
    }

    /// Draw a plan from the bank.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySelection` for an explicit policy without ids
    /// and `SessionError::EmptyPool` when nothing could be drawn.
    pub fn draw(&self, bank: &QuestionBank) -> Result<SessionPlan, SessionError> {
        self.draw_with(bank, &mut rng())
    }

    /// [`SelectionPolicy::draw`] with a caller-supplied generator.
    ///
    /// # Errors
    ///
    /// See [`SelectionPolicy::draw`].
    pub fn draw_with<R: Rng + ?Sized>(
        &self,
        bank: &QuestionBank,
        rng: &mut R,
    ) -> Result<SessionPlan, SessionError> {
        let pool = bank.pool(self.kind());
        let questions = match self {
            Self::Random { size, .. } => {
                if pool.is_empty() {
                    return Err(SessionError::EmptyPool);
                }
                sample_random_with(pool, *size, rng)
            }
            Self::Explicit { ids, .. } => select_explicit(pool, ids)?,
        };
        if questions.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        Ok(SessionPlan {
            policy: self.clone(),
            questions,
        })
    }
}

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub policy: SelectionPolicy,
    pub questions: Vec<Question>,
}

impl SessionPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when no questions were selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn judge_pool(n: u64) -> Vec<Question> {
        (1..=n)
            .map(|id| Question::true_false(QuestionId::new(id), format!("Q{id}"), Some("对".into())))
            .collect()
    }

    fn bank_with_judges(n: usize) -> QuestionBank {
        let mut builder = QuestionBank::builder();
        for i in 0..n {
            builder.push_judge(&format!("Q{i}"), Some("错".into()));
        }
        builder.build()
    }

    #[test]
    fn sample_random_returns_distinct_members() {
        let pool = judge_pool(20);
        for n in [0, 1, 5, 20, 40] {
            let drawn = sample_random(&pool, n);
            assert_eq!(drawn.len(), n.min(pool.len()));
            let ids: HashSet<_> = drawn.iter().map(Question::id).collect();
            assert_eq!(ids.len(), drawn.len());
            assert!(drawn.iter().all(|q| pool.contains(q)));
        }
    }

    #[test]
    fn sample_random_on_empty_pool_is_empty() {
        assert!(sample_random(&[], 15).is_empty());
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let pool = judge_pool(10);
        let a = sample_random_with(&pool, 4, &mut StdRng::seed_from_u64(7));
        let b = sample_random_with(&pool, 4, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn select_explicit_keeps_bank_order() {
        let pool = judge_pool(5);
        let chosen = [QuestionId::new(4), QuestionId::new(2)];
        let picked = select_explicit(&pool, &chosen).unwrap();
        let ids: Vec<_> = picked.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn select_explicit_without_ids_fails() {
        let err = select_explicit(&judge_pool(3), &[]).unwrap_err();
        assert!(matches!(err, SessionError::EmptySelection));
    }

    #[test]
    fn select_explicit_with_unknown_ids_is_empty() {
        let picked = select_explicit(&judge_pool(3), &[QuestionId::new(99)]).unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn random_policy_caps_at_size() {
        let bank = bank_with_judges(30);
        let plan = SelectionPolicy::random(PoolKind::Judge).draw(&bank).unwrap();
        assert_eq!(plan.total(), DEFAULT_SESSION_SIZE);
        assert_eq!(plan.policy.kind(), PoolKind::Judge);
    }

    #[test]
    fn random_policy_on_empty_pool_reports_empty_pool() {
        let bank = bank_with_judges(3);
        let err = SelectionPolicy::random(PoolKind::Fill).draw(&bank).unwrap_err();
        assert!(matches!(err, SessionError::EmptyPool));
    }

    #[test]
    fn explicit_policy_with_no_matches_reports_empty_pool() {
        let bank = bank_with_judges(3);
        let policy = SelectionPolicy::explicit(PoolKind::Judge, [QuestionId::new(42)]);
        assert!(matches!(policy.draw(&bank).unwrap_err(), SessionError::EmptyPool));

        let policy = SelectionPolicy::explicit(PoolKind::Judge, Vec::<QuestionId>::new());
        assert!(matches!(policy.draw(&bank).unwrap_err(), SessionError::EmptySelection));
    }
}
