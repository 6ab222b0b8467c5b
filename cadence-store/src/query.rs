//! Request-side inputs: new tasks, edits and list filters.

use std::fmt;
use std::str::FromStr;

use cadence_core::{
    EngineError, Priority, Recurrence, RecurrencePattern, Task, TaskStatus, WindowType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest custom window the request layer accepts.
pub const MAX_CUSTOM_DAYS: i64 = 365;

/// A task-creation request, already parsed from the form/CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub window: WindowType,
    #[serde(default)]
    pub window_value: Option<i64>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub recurrence: Option<RecurrenceInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceInput {
    pub pattern: RecurrencePattern,
    #[serde(default = "default_interval")]
    pub interval: u32,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceInput {
    pub fn validate(&self) -> Result<Recurrence, EngineError> {
        Recurrence::new(self.pattern, self.interval)
    }
}

impl NewTask {
    pub fn new(title: impl Into<String>, window: WindowType) -> Self {
        Self {
            title: title.into(),
            description: None,
            window,
            window_value: None,
            priority: Priority::Medium,
            tags: Vec::new(),
            recurrence: None,
        }
    }

    pub fn with_days(mut self, days: i64) -> Self {
        self.window_value = Some(days);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn recurring(mut self, pattern: RecurrencePattern, interval: u32) -> Self {
        self.recurrence = Some(RecurrenceInput { pattern, interval });
        self
    }

    /// Form-level checks on top of the engine's own validation.
    pub(crate) fn check_form_limits(&self) -> Result<(), EngineError> {
        if self.window == WindowType::Custom {
            if let Some(days) = self.window_value {
                if days > MAX_CUSTOM_DAYS {
                    return Err(EngineError::validation(format!(
                        "custom window must be between 1 and {MAX_CUSTOM_DAYS} days"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Editable fields. The window and deadline are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskEdit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
    }
}

/// Task list filter, mirroring the `?status=` query values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Active or at risk.
    #[default]
    Active,
    Overdue,
    Completed,
    Archived,
    All,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Overdue => "overdue",
            StatusFilter::Completed => "completed",
            StatusFilter::Archived => "archived",
            StatusFilter::All => "all",
        }
    }

    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        if *self == StatusFilter::Archived {
            return task.archived;
        }
        if task.archived {
            return false;
        }
        match self {
            StatusFilter::Active => task.status(now).is_open(),
            StatusFilter::Overdue => task.status(now) == TaskStatus::Overdue,
            StatusFilter::Completed => task.is_completed(),
            StatusFilter::All | StatusFilter::Archived => true,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(StatusFilter::Active),
            "overdue" => Ok(StatusFilter::Overdue),
            "completed" => Ok(StatusFilter::Completed),
            "archived" => Ok(StatusFilter::Archived),
            "all" => Ok(StatusFilter::All),
            other => Err(EngineError::validation(format!("unknown status filter '{other}'"))),
        }
    }
}
