//! On-demand status classification.
//!
//! Status is never a stored source of truth: it is recomputed from `deadline`, `completed_at`
//! and the caller-supplied `now` every time a task is observed.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    AtRisk,
    Overdue,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::AtRisk => "at_risk",
            TaskStatus::Overdue => "overdue",
            TaskStatus::Completed => "completed",
        }
    }

    /// Still open (active or at risk).
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Active | TaskStatus::AtRisk)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task is at risk once less than 1/AT_RISK_DIVISOR (20%) of its original window remains.
pub const AT_RISK_DIVISOR: i128 = 5;

/// Classify a task's status at `now`.
///
/// Order matters:
/// 1. completed wins over everything
/// 2. degenerate windows (deadline not after creation) are overdue from the deadline on
/// 3. past the deadline is overdue
/// 4. `remaining < 0.2 * total` is at risk; the exact boundary stays active
pub fn classify_status(
    deadline: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> TaskStatus {
    if completed_at.is_some() {
        return TaskStatus::Completed;
    }

    let total = (deadline - created_at).num_milliseconds() as i128;
    if total <= 0 {
        return if now >= deadline {
            TaskStatus::Overdue
        } else {
            TaskStatus::Active
        };
    }

    if now > deadline {
        return TaskStatus::Overdue;
    }

    // remaining < total / 5, kept in integers so the boundary is exact.
    let remaining = (deadline - now).num_milliseconds() as i128;
    if remaining * AT_RISK_DIVISOR < total {
        TaskStatus::AtRisk
    } else {
        TaskStatus::Active
    }
}

/// Human-readable remaining time, e.g. "2d 3h remaining" or "Overdue by 45m".
pub fn time_remaining(
    deadline: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    if completed_at.is_some() {
        return "Completed".to_string();
    }
    if now > deadline {
        return format!("Overdue by {}", format_span(now - deadline));
    }
    format!("{} remaining", format_span(deadline - now))
}

fn format_span(delta: Duration) -> String {
    let days = delta.num_days();
    let hours = delta.num_hours() % 24;
    let minutes = delta.num_minutes() % 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
