//! Recurring tasks: the next instance is spawned when one is completed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::task::Task;
use crate::window::{MONTHLY_DAYS, WEEKLY_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrencePattern {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            other => Err(EngineError::validation(format!(
                "unknown recurrence pattern '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    /// Every N days/weeks/months.
    pub interval: u32,
}

/// Largest accepted interval, in pattern units.
pub const MAX_INTERVAL: u32 = 365;

impl Recurrence {
    pub fn new(pattern: RecurrencePattern, interval: u32) -> EngineResult<Self> {
        if interval == 0 || interval > MAX_INTERVAL {
            return Err(EngineError::validation(format!(
                "recurrence interval must be between 1 and {MAX_INTERVAL}"
            )));
        }
        Ok(Self { pattern, interval })
    }

    /// Distance between consecutive deadlines. Months are approximated as 30 days.
    ///
    /// Records loaded from disk bypass [`Recurrence::new`], so the range is checked here too.
    pub fn step(&self) -> EngineResult<Duration> {
        let unit = match self.pattern {
            RecurrencePattern::Daily => 1,
            RecurrencePattern::Weekly => WEEKLY_DAYS,
            RecurrencePattern::Monthly => MONTHLY_DAYS,
        };
        i64::from(self.interval)
            .checked_mul(unit)
            .and_then(Duration::try_days)
            .filter(|step| *step > Duration::zero())
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "invalid recurrence: every {} {}",
                    self.interval, self.pattern
                ))
            })
    }
}

/// Timing of the instance that follows a completed recurring task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextInstance {
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

/// Next instance of a recurring task, created at `now`.
///
/// The deadline advances from the previous deadline by whole steps until it lies after `now`,
/// so a late completion never spawns a task that is overdue on arrival. `Ok(None)` for a
/// task without recurrence.
pub fn next_instance(task: &Task, now: DateTime<Utc>) -> EngineResult<Option<NextInstance>> {
    let Some(recurrence) = task.recurrence else {
        return Ok(None);
    };
    let step = recurrence.step()?;
    let out_of_range =
        || EngineError::validation(format!("next deadline of task {} is out of range", task.id));

    let mut deadline = task.deadline.checked_add_signed(step).ok_or_else(out_of_range)?;
    if deadline <= now {
        let step_ms = step.num_milliseconds();
        let skips = (now - deadline).num_milliseconds() / step_ms + 1;
        let jump = skips
            .checked_mul(step_ms)
            .and_then(Duration::try_milliseconds)
            .ok_or_else(out_of_range)?;
        deadline = deadline.checked_add_signed(jump).ok_or_else(out_of_range)?;
    }

    Ok(Some(NextInstance {
        created_at: now,
        deadline,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowType;
    use chrono::TimeZone;

    fn weekly_task() -> Task {
        let created = Utc.with_ymd_and_hms(2026, 2, 2, 9, 0, 0).unwrap();
        Task::create(1, 1, "Water plants", created, WindowType::Weekly, None, "UTC")
            .unwrap()
            .with_recurrence(Recurrence::new(RecurrencePattern::Weekly, 1).unwrap())
    }

    #[test]
    fn non_recurring_has_no_next() {
        let mut t = weekly_task();
        t.recurrence = None;
        assert!(next_instance(&t, t.created_at).unwrap().is_none());
    }

    #[test]
    fn on_time_completion_advances_one_step() {
        let t = weekly_task();
        let now = t.deadline - Duration::days(1);
        let next = next_instance(&t, now).unwrap().unwrap();
        assert_eq!(next.deadline, t.deadline + Duration::days(7));
        assert_eq!(next.created_at, now);
        assert!(next.deadline > next.created_at);
    }

    #[test]
    fn late_completion_skips_missed_steps() {
        let t = weekly_task();
        let now = t.deadline + Duration::days(10);
        let next = next_instance(&t, now).unwrap().unwrap();
        // deadline+7 is still past; deadline+14 is the first after now
        assert_eq!(next.deadline, t.deadline + Duration::days(14));
        assert!(next.deadline > now);
    }

    #[test]
    fn exact_step_boundary_moves_past_now() {
        let t = weekly_task();
        let now = t.deadline + Duration::days(7);
        let next = next_instance(&t, now).unwrap().unwrap();
        assert_eq!(next.deadline, t.deadline + Duration::days(14));
    }

    #[test]
    fn interval_scales_step() {
        let r = Recurrence::new(RecurrencePattern::Monthly, 2).unwrap();
        assert_eq!(r.step().unwrap(), Duration::days(60));
        let d = Recurrence::new(RecurrencePattern::Daily, 3).unwrap();
        assert_eq!(d.step().unwrap(), Duration::days(3));
    }

    #[test]
    fn interval_out_of_range_rejected() {
        assert!(Recurrence::new(RecurrencePattern::Daily, 0).unwrap_err().is_validation());
        let too_long = Recurrence::new(RecurrencePattern::Monthly, MAX_INTERVAL + 1);
        assert!(too_long.unwrap_err().is_validation());
        assert!(Recurrence::new(RecurrencePattern::Monthly, MAX_INTERVAL).is_ok());
        assert!("yearly".parse::<RecurrencePattern>().is_err());
    }

    #[test]
    fn huge_stored_interval_is_an_error_not_a_panic() {
        let mut t = weekly_task();
        t.recurrence = Some(Recurrence {
            pattern: RecurrencePattern::Monthly,
            interval: 4_000_000,
        });
        let err = next_instance(&t, t.created_at).unwrap_err();
        assert!(err.is_validation());

        t.recurrence = Some(Recurrence {
            pattern: RecurrencePattern::Daily,
            interval: 0,
        });
        assert!(next_instance(&t, t.created_at).unwrap_err().is_validation());
    }

    #[test]
    fn very_late_completion_skips_many_steps() {
        let t = weekly_task();
        let now = t.deadline + Duration::days(7 * 1000 + 3);
        let next = next_instance(&t, now).unwrap().unwrap();
        assert_eq!(next.deadline, t.deadline + Duration::days(7 * 1001));
    }
}
