//! Usage windows.
//!
//! Monthly counters cover the UTC calendar month containing `now`; nothing is
//! reset explicitly, the window simply moves.

use chrono::{DateTime, Datelike, Days, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn containing(now: DateTime<Utc>) -> Self {
        let first_day = now.date_naive() - Days::new(u64::from(now.day0()));
        let start = first_day.and_time(NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + Months::new(1),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}
