//! Completion decisions: when a task is marked done or reopened.
//!
//! These are pure decisions; persisting them is the caller's job.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionQuality {
    OnTime,
    Late,
}

impl CompletionQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionQuality::OnTime => "on_time",
            CompletionQuality::Late => "late",
        }
    }

    /// On time iff completed at or before the deadline.
    pub fn judge(completed_at: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        if completed_at <= deadline {
            CompletionQuality::OnTime
        } else {
            CompletionQuality::Late
        }
    }
}

impl fmt::Display for CompletionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub completed_at: DateTime<Utc>,
    pub quality: CompletionQuality,
}

/// Decide the completion of `task` at `now`.
pub fn complete_task(task: &Task, now: DateTime<Utc>) -> EngineResult<Completion> {
    if task.is_completed() {
        return Err(EngineError::invalid_state(format!(
            "task {} is already completed",
            task.id
        )));
    }
    // A clock skewed behind creation must not produce completed_at < created_at.
    let completed_at = now.max(task.created_at);
    Ok(Completion {
        completed_at,
        quality: CompletionQuality::judge(completed_at, task.deadline),
    })
}

/// Return a copy of `task` with completion cleared. The original deadline is kept.
pub fn reopen_task(task: &Task) -> EngineResult<Task> {
    let mut reopened = task.clone();
    reopened.reopen()?;
    Ok(reopened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::TaskStatus;
    use crate::window::WindowType;
    use chrono::{Duration, TimeZone};

    fn task() -> Task {
        let created = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
        Task::create(1, 1, "Ship it", created, WindowType::Custom, Some(2), "UTC").unwrap()
    }

    #[test]
    fn on_time_at_or_before_deadline() {
        let t = task();
        let c = complete_task(&t, t.deadline).unwrap();
        assert_eq!(c.quality, CompletionQuality::OnTime);
        assert_eq!(c.completed_at, t.deadline);

        let early = complete_task(&t, t.created_at + Duration::hours(1)).unwrap();
        assert_eq!(early.quality, CompletionQuality::OnTime);
    }

    #[test]
    fn late_completion_overrides_overdue() {
        let mut t = task();
        let now = t.deadline + Duration::seconds(1);
        assert_eq!(t.status(now), TaskStatus::Overdue);

        let c = complete_task(&t, now).unwrap();
        assert_eq!(c.quality, CompletionQuality::Late);
        t.apply_completion(c);
        assert_eq!(t.status(now), TaskStatus::Completed);
        assert_eq!(t.completion_quality, Some(CompletionQuality::Late));
    }

    #[test]
    fn completing_twice_is_invalid_state() {
        let mut t = task();
        let c = complete_task(&t, t.created_at).unwrap();
        t.apply_completion(c);
        let err = complete_task(&t, t.created_at + Duration::minutes(1)).unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn reopen_clears_both_fields_and_keeps_deadline() {
        let mut t = task();
        let deadline = t.deadline;
        t.apply_completion(complete_task(&t, deadline + Duration::hours(3)).unwrap());

        let reopened = reopen_task(&t).unwrap();
        assert_eq!(reopened.completed_at, None);
        assert_eq!(reopened.completion_quality, None);
        assert_eq!(reopened.deadline, deadline);
        assert_ne!(reopened.status(deadline), TaskStatus::Completed);
    }

    #[test]
    fn reopen_open_task_is_invalid_state() {
        assert!(reopen_task(&task()).unwrap_err().is_invalid_state());
    }

    #[test]
    fn recompletion_is_judged_fresh_against_original_deadline() {
        let mut t = task();
        t.apply_completion(complete_task(&t, t.deadline - Duration::hours(1)).unwrap());
        assert_eq!(t.completion_quality, Some(CompletionQuality::OnTime));

        t = reopen_task(&t).unwrap();
        assert_eq!(t.completion_quality, None);

        // the second completion lands after the unchanged deadline, so the quality flips
        let late_at = t.deadline + Duration::days(2);
        t.apply_completion(complete_task(&t, late_at).unwrap());
        assert_eq!(t.completion_quality, Some(CompletionQuality::Late));
        assert_eq!(t.completed_at, Some(late_at));
    }

    #[test]
    fn quality_matches_deadline_comparison() {
        let t = task();
        for offset in [-3_600, -1, 0, 1, 3_600] {
            let now = t.deadline + Duration::seconds(offset);
            let c = complete_task(&t, now).unwrap();
            assert_eq!(c.quality == CompletionQuality::OnTime, now <= t.deadline);
        }
    }

    #[test]
    fn completion_never_precedes_creation() {
        let t = task();
        let c = complete_task(&t, t.created_at - Duration::minutes(5)).unwrap();
        assert_eq!(c.completed_at, t.created_at);
    }
}
