//! Clock collaborator for "today" decisions.
//!
//! # Responsibility
//! - Provide the current local calendar date behind a seam the service can
//!   be constructed with, so date-relative behavior is deterministic in
//!   tests.
//!
//! # Invariants
//! - `today()` returns a local wall-clock date; no timezone handling beyond
//!   the host zone.

use chrono::{Local, NaiveDate};

/// Source of the current calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Production clock reading the host's local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Deterministic clock pinned to one date. Intended for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_returns_pinned_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(FixedClock(date).today(), date);
    }
}
