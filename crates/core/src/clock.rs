//! Clock abstraction.
//!
//! Evaluation and transitions never read ambient time; they take it from a
//! [`Clock`] so tests and batch re-evaluations stay deterministic.

use chrono::{DateTime, NaiveDate, Utc};

/// Provides the current timestamp to services that need one.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Creates a fixed clock from a date, pinned to midnight UTC.
    #[must_use]
    pub fn at_midnight(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
