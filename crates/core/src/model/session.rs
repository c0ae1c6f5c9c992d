use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::PoolKind;

/// Accuracy at or above which a run counts as passed.
pub const PASS_ACCURACY: f64 = 0.6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score ({score}) exceeds question count ({total})")]
    ScoreExceedsTotal { score: usize, total: usize },
}

/// Result of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    kind: PoolKind,
    total: usize,
    score: usize,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if the score exceeds the total or the
    /// timestamps are out of order.
    pub fn new(
        kind: PoolKind,
        total: usize,
        score: usize,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if score > total {
            return Err(SessionSummaryError::ScoreExceedsTotal { score, total });
        }
        Ok(Self {
            kind,
            total,
            score,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// `score / total`, or 0 for an empty run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 / self.total as f64
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.accuracy() >= PASS_ACCURACY
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.completed_at - self.started_at
    }
}
