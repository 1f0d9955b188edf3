//! Clock implementations.
//!
//! `SystemClock` is the production source. `ManualClock` is a settable
//! clock for tests and scripted demos — the Friday review gate and the
//! week-number derivation are untestable against a real wall clock.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

use crate::traits::Clock;

/// The real wall clock (UTC).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to an explicit instant, advanced by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Pin the clock to `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Pin the clock to midnight UTC on `date`.
    pub fn on_date(date: NaiveDate) -> Self {
        let now = date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_utc();
        Self::at(now)
    }

    /// Move the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock poisoned") = now;
    }

    /// Move the clock to midnight UTC on `date`.
    pub fn set_date(&self, date: NaiveDate) {
        self.set(
            date.and_hms_opt(0, 0, 0)
                .expect("midnight is always a valid time")
                .and_utc(),
        );
    }

    /// Advance the clock by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += chrono::Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
