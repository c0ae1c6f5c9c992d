use chrono::{DateTime, Utc};

/// Where a quiz session gets its start and completion stamps.
///
/// A session is stamped when it starts, and the advance past its last
/// question stamps completion; the summary's elapsed time is the gap.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Wall-clock time.
    #[default]
    System,
    /// Every stamp is the same instant; elapsed time is zero.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Seconds since the epoch used to stamp sessions in tests.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Session stamp at [`FIXED_TEST_TIMESTAMP`].
///
/// # Panics
///
/// Panics if the timestamp is out of chrono's range.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Clock that starts and completes every session at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
