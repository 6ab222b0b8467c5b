//! Display-ready projection of a single task.

use cadence_core::time::format_local;
use cadence_core::{CompletionQuality, Priority, Task, TaskStatus, WindowType};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCard {
    pub id: u64,
    pub title: String,
    pub priority: Priority,
    pub window: WindowType,
    pub window_label: String,
    pub deadline: DateTime<Utc>,
    /// Deadline in the viewer's zone.
    pub deadline_local: String,
    pub status: TaskStatus,
    pub time_remaining: String,
    pub tags: Vec<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completion_quality: Option<CompletionQuality>,
    pub recurring: bool,
}

pub fn task_card(task: &Task, now: DateTime<Utc>, tz: Tz) -> TaskCard {
    TaskCard {
        id: task.id,
        title: task.title.clone(),
        priority: task.priority,
        window: task.window,
        window_label: task.window.describe(task.window_value),
        deadline: task.deadline,
        deadline_local: format_local(task.deadline, tz),
        status: task.status(now),
        time_remaining: task.time_remaining(now),
        tags: task.tags.clone(),
        completed_at: task.completed_at,
        completion_quality: task.completion_quality,
        recurring: task.is_recurring(),
    }
}
