//! Completion statistics over a reporting period.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::completion::CompletionQuality;
use crate::period::Period;
use crate::status::TaskStatus;
use crate::task::Task;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub total: usize,
    pub completed: usize,
    pub completed_on_time: usize,
    pub completed_late: usize,
    pub overdue: usize,
    /// completed_on_time / total, 0.0 for an empty period.
    pub completion_rate: f64,
    /// completion_rate as a percentage rounded to one decimal.
    pub on_time_rate: f64,
}

/// Fold the non-archived tasks whose deadline falls in `period`.
pub fn aggregate<'a, I>(tasks: I, period: &Period, now: DateTime<Utc>) -> PeriodStats
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut stats = PeriodStats::default();

    for t in tasks {
        if t.archived || !period.contains(t.deadline) {
            continue;
        }
        stats.total += 1;
        match t.status(now) {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Overdue => stats.overdue += 1,
            TaskStatus::Active | TaskStatus::AtRisk => {}
        }
        match t.completion_quality {
            Some(CompletionQuality::OnTime) => stats.completed_on_time += 1,
            Some(CompletionQuality::Late) => stats.completed_late += 1,
            None => {}
        }
    }

    if stats.total > 0 {
        stats.completion_rate = stats.completed_on_time as f64 / stats.total as f64;
        stats.on_time_rate = (stats.completion_rate * 1000.0).round() / 10.0;
    }
    stats
}
