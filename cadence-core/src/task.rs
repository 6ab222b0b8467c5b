//! Task model with flexible completion windows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::completion::{Completion, CompletionQuality};
use crate::error::{EngineError, EngineResult};
use crate::recurrence::Recurrence;
use crate::status::{TaskStatus, classify_status, time_remaining};
use crate::window::{WindowType, compute_deadline};

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(EngineError::validation(format!(
                "unknown priority '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Core task record.
///
/// `deadline` is computed once at creation and stored; a later time-zone change on the
/// owner's profile never moves it. `status` is not stored, see [`Task::status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub owner: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub window: WindowType,
    /// Days; only set for custom windows.
    #[serde(default)]
    pub window_value: Option<i64>,
    pub deadline: DateTime<Utc>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_quality: Option<CompletionQuality>,

    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    /// Root of the recurring series this task belongs to.
    #[serde(default)]
    pub parent_id: Option<u64>,
    /// Instance spawned when this one was first completed; a series spawns once per task.
    #[serde(default)]
    pub next_id: Option<u64>,
}

impl Task {
    /// Create a task at `created_at`, computing its deadline in the owner's zone.
    pub fn create(
        id: u64,
        owner: u64,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
        window: WindowType,
        window_value: Option<i64>,
        tz: &str,
    ) -> EngineResult<Self> {
        let title = validate_title(title.into())?;
        let deadline = compute_deadline(created_at, window, window_value, tz)?;
        let window_value = match window {
            WindowType::Custom => window_value,
            _ => None,
        };

        Ok(Self {
            id,
            owner,
            title,
            description: None,
            created_at,
            window,
            window_value,
            deadline,
            completed_at: None,
            completion_quality: None,
            priority: Priority::Medium,
            tags: Vec::new(),
            archived: false,
            recurrence: None,
            parent_id: None,
            next_id: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let d = description.into();
        self.description = if d.trim().is_empty() { None } else { Some(d) };
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

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn status(&self, now: DateTime<Utc>) -> TaskStatus {
        classify_status(self.deadline, self.completed_at, self.created_at, now)
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> String {
        time_remaining(self.deadline, self.completed_at, now)
    }

    /// Record a completion decision from [`crate::completion::complete_task`].
    pub fn apply_completion(&mut self, completion: Completion) {
        self.completed_at = Some(completion.completed_at);
        self.completion_quality = Some(completion.quality);
    }

    /// Clear completion in place. The deadline is left untouched.
    pub fn reopen(&mut self) -> EngineResult<()> {
        if !self.is_completed() {
            return Err(EngineError::invalid_state(format!(
                "task {} is not completed",
                self.id
            )));
        }
        self.completed_at = None;
        self.completion_quality = None;
        Ok(())
    }
}

pub fn validate_title(title: String) -> EngineResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation("title must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(EngineError::validation(format!(
            "title must be between 1 and {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Split a comma-separated tag string, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
    }

    #[test]
    fn create_computes_deadline_and_starts_open() {
        let t = Task::create(1, 7, "Write report", t0(), WindowType::Weekly, None, "UTC").unwrap();
        assert_eq!(t.deadline, t0() + Duration::days(7));
        assert!(!t.is_completed());
        assert_eq!(t.completion_quality, None);
        assert_eq!(t.status(t0()), TaskStatus::Active);
        assert!(t.deadline > t.created_at);
    }

    #[test]
    fn create_drops_window_value_for_fixed_windows() {
        let t = Task::create(1, 7, "x", t0(), WindowType::Monthly, Some(12), "UTC").unwrap();
        assert_eq!(t.window_value, None);

        let c = Task::create(2, 7, "y", t0(), WindowType::Custom, Some(12), "UTC").unwrap();
        assert_eq!(c.window_value, Some(12));
    }

    #[test]
    fn create_rejects_bad_titles() {
        assert!(Task::create(1, 1, "   ", t0(), WindowType::Daily, None, "UTC").is_err());
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(Task::create(1, 1, long, t0(), WindowType::Daily, None, "UTC").is_err());
    }

    #[test]
    fn reopen_requires_completion() {
        let mut t = Task::create(1, 1, "x", t0(), WindowType::Daily, None, "UTC").unwrap();
        assert!(t.reopen().unwrap_err().is_invalid_state());
    }

    #[test]
    fn parse_tags_trims_and_drops_blanks() {
        assert_eq!(parse_tags(" home, ,errands ,"), vec!["home", "errands"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn priority_orders_high_last() {
        assert!(Priority::High > Priority::Medium);
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn task_round_trips_through_json_with_defaults() {
        let json = r#"{
            "id": 3, "owner": 1, "title": "legacy",
            "created_at": "2026-05-04T10:00:00Z",
            "window": "daily",
            "deadline": "2026-05-04T23:59:59.999Z"
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.priority, Priority::Medium);
        assert!(t.tags.is_empty());
        assert!(!t.archived);
    }
}
