//! Daily streaks and daily-goal progress.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::task::Task;
use crate::time::local_date;

pub const DEFAULT_STREAK_FREEZES: u32 = 2;
pub const DEFAULT_DAILY_GOAL: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    pub last_activity: Option<NaiveDate>,
    /// Remaining "skip a day" protections.
    pub freezes: u32,
}

impl Default for Streak {
    fn default() -> Self {
        Self {
            current: 0,
            longest: 0,
            last_activity: None,
            freezes: DEFAULT_STREAK_FREEZES,
        }
    }
}

impl Streak {
    /// Fold one observation of `today` into the streak.
    ///
    /// A gap of more than one day since `last_activity` costs one freeze, which covers the
    /// gap by moving `last_activity` to yesterday; with no freeze left the streak breaks.
    /// Repeated observations on the same day are therefore idempotent. A completion then
    /// extends a streak that reaches yesterday, or starts a new one.
    pub fn record_day(&mut self, today: NaiveDate, completed_today: bool) {
        if self.last_activity == Some(today) {
            return;
        }
        let yesterday = today - Duration::days(1);

        if matches!(self.last_activity, Some(last) if last < yesterday) && self.current > 0 {
            if self.freezes > 0 {
                self.freezes -= 1;
                self.last_activity = Some(yesterday);
            } else {
                self.current = 0;
            }
        }

        if completed_today {
            self.current = if self.last_activity == Some(yesterday) {
                self.current + 1
            } else {
                1
            };
            self.last_activity = Some(today);
            self.longest = self.longest.max(self.current);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub completed: usize,
    pub goal: u32,
    /// Capped at 100.
    pub percentage: f64,
}

impl DailyProgress {
    pub fn new(completed: usize, goal: u32) -> Self {
        let percentage = if goal > 0 {
            (completed as f64 / f64::from(goal) * 100.0).min(100.0)
        } else {
            0.0
        };
        Self {
            completed,
            goal,
            percentage,
        }
    }

    pub fn goal_reached(&self) -> bool {
        self.goal > 0 && self.completed >= self.goal as usize
    }
}

/// Count of `tasks` completed on the local day containing `now`.
pub fn completed_on_day<'a, I>(tasks: I, now: DateTime<Utc>, tz: Tz) -> usize
where
    I: IntoIterator<Item = &'a Task>,
{
    let today = local_date(now, tz);
    tasks
        .into_iter()
        .filter_map(|t| t.completed_at)
        .filter(|c| local_date(*c, tz) == today)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, day).unwrap()
    }

    #[test]
    fn consecutive_days_extend_streak() {
        let mut s = Streak::default();
        s.record_day(d(1), true);
        s.record_day(d(2), true);
        s.record_day(d(3), true);
        assert_eq!(s.current, 3);
        assert_eq!(s.longest, 3);
    }

    #[test]
    fn same_day_is_counted_once() {
        let mut s = Streak::default();
        s.record_day(d(1), true);
        s.record_day(d(1), true);
        s.record_day(d(1), false);
        assert_eq!(s.current, 1);
    }

    #[test]
    fn gap_without_freezes_restarts_streak() {
        let mut s = Streak::default();
        s.freezes = 0;
        s.record_day(d(1), true);
        s.record_day(d(2), true);
        s.record_day(d(5), true);
        assert_eq!(s.current, 1);
        assert_eq!(s.longest, 2);
    }

    #[test]
    fn repeated_checks_on_one_day_cost_one_freeze() {
        let mut s = Streak::default();
        s.record_day(d(1), true);
        s.record_day(d(2), true);

        for _ in 0..3 {
            s.record_day(d(4), false);
        }
        assert_eq!((s.current, s.freezes), (2, 1));
        assert_eq!(s.last_activity, Some(d(3)));
    }

    #[test]
    fn frozen_day_keeps_streak_alive() {
        let mut s = Streak::default();
        s.record_day(d(1), true);
        s.record_day(d(2), true);
        s.record_day(d(4), false);
        s.record_day(d(4), true);
        assert_eq!((s.current, s.freezes), (3, 1));

        // no idle check in between: the completion itself spends the freeze
        s.record_day(d(6), true);
        assert_eq!((s.current, s.freezes), (4, 0));
        assert_eq!(s.longest, 4);
    }

    #[test]
    fn idle_gaps_burn_freezes_then_break() {
        let mut s = Streak::default();
        s.record_day(d(1), true);
        s.record_day(d(2), true);

        s.record_day(d(5), false);
        assert_eq!((s.current, s.freezes), (2, 1));
        s.record_day(d(8), false);
        assert_eq!((s.current, s.freezes), (2, 0));
        s.record_day(d(10), false);
        assert_eq!(s.current, 0);
        s.record_day(d(10), true);
        assert_eq!((s.current, s.longest), (1, 2));
    }

    #[test]
    fn idle_check_the_day_after_is_harmless() {
        let mut s = Streak::default();
        s.record_day(d(1), true);
        s.record_day(d(2), false);
        assert_eq!((s.current, s.freezes), (1, DEFAULT_STREAK_FREEZES));
    }

    #[test]
    fn progress_caps_at_hundred_and_handles_zero_goal() {
        assert_eq!(DailyProgress::new(5, 3).percentage, 100.0);
        assert_eq!(DailyProgress::new(1, 4).percentage, 25.0);
        assert_eq!(DailyProgress::new(2, 0).percentage, 0.0);
        assert!(DailyProgress::new(3, 3).goal_reached());
        assert!(!DailyProgress::new(3, 0).goal_reached());
    }
}
