//! Reporting periods (day / week / month) and daily trend series.
//!
//! Period boundaries are local calendar days in the user's zone, converted to UTC instants.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::task::Task;
use crate::time::{end_of_local_day, local_date, start_of_local_day};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tz: Tz,
}

impl Period {
    pub fn day(date: NaiveDate, tz: Tz) -> Self {
        Self { start: date, end: date, tz }
    }

    /// The 7 local days ending on (and including) `date`.
    pub fn week_ending(date: NaiveDate, tz: Tz) -> Self {
        Self {
            start: date - Duration::days(6),
            end: date,
            tz,
        }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate, tz: Tz) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let mut end = date;
        while let Some(next) = end.succ_opt() {
            if next.month() != date.month() {
                break;
            }
            end = next;
        }
        Self { start, end, tz }
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        start_of_local_day(self.start, self.tz)
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        end_of_local_day(self.end, self.tz)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.starts_at() && instant <= self.ends_at()
    }

    /// e.g. "January 2026"
    pub fn month_label(&self) -> String {
        self.start.format("%B %Y").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short weekday, e.g. "Mon".
    pub label: String,
    pub created: usize,
    pub completed: usize,
}

/// Longest trend series served; longer requests are clamped.
pub const MAX_TREND_DAYS: u32 = 365;

/// Tasks created / completed per local day for the `days` days ending on `end_date`.
///
/// Oldest first. `days` is clamped to [`MAX_TREND_DAYS`].
pub fn daily_trend(tasks: &[Task], end_date: NaiveDate, days: u32, tz: Tz) -> Vec<TrendPoint> {
    (0..u64::from(days.min(MAX_TREND_DAYS)))
        .rev()
        .filter_map(|back| end_date.checked_sub_days(Days::new(back)))
        .map(|date| {
            let created = tasks
                .iter()
                .filter(|t| local_date(t.created_at, tz) == date)
                .count();
            let completed = tasks
                .iter()
                .filter_map(|t| t.completed_at)
                .filter(|c| local_date(*c, tz) == date)
                .count();
            TrendPoint {
                date,
                label: date.format("%a").to_string(),
                created,
                completed,
            }
        })
        .collect()
}
