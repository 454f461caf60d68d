//! Injectable time source.
//!
//! Anything that reads "now" (the current-date tool, cache expiry) takes a
//! `Clock` so tests can pin time.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of the current instant.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current UTC instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock pinned to midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.today(), date);

        clock.advance(chrono::Duration::days(2));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    }
}
