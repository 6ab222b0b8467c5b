//! File-backed store: one JSON document holding users and tasks.
//!
//! The store is single-writer. Callers that share it across requests must serialize access
//! (the HTTP server keeps it behind a mutex), so each complete/reopen is an atomic
//! read-modify-write of one task record.

use std::fs;
use std::path::{Path, PathBuf};

use cadence_core::{
    Achievement, Task, UserProfile, completed_on_day, complete_task, local_date, next_instance,
    parse_tz,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::query::{NewTask, StatusFilter, TaskEdit};

pub const STORE_FILE: &str = "store.json";
pub const SCHEMA_VERSION: u32 = 1;

const MAX_USERNAME_LEN: usize = 80;
const MAX_EMAIL_LEN: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDoc {
    pub version: u32,
    pub next_user_id: u64,
    pub next_task_id: u64,
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Default for StoreDoc {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            next_user_id: 1,
            next_task_id: 1,
            users: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

/// Result of completing a task.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub task: Task,
    /// Next instance spawned for a recurring task.
    pub next_instance: Option<Task>,
    pub new_achievements: Vec<&'static Achievement>,
}

#[derive(Debug)]
pub struct Store {
    path: Option<PathBuf>,
    doc: StoreDoc,
}

impl StoreDoc {
    fn user(&self, id: u64) -> StoreResult<&UserProfile> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    fn user_mut(&mut self, id: u64) -> StoreResult<&mut UserProfile> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    fn owned(&self, user_id: u64) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.owner == user_id)
    }

    fn task_index_for(&self, user_id: u64, task_id: u64) -> StoreResult<usize> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| StoreError::NotFound(format!("task {task_id}")))?;
        if self.tasks[idx].owner != user_id {
            return Err(StoreError::AccessDenied);
        }
        Ok(idx)
    }
}

impl Store {
    /// Open (or start) the store under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(STORE_FILE);

        let doc = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| StoreError::Serde {
                path: path.clone(),
                source,
            })?
        } else {
            StoreDoc::default()
        };

        debug!(
            path = %path.display(),
            users = doc.users.len(),
            tasks = doc.tasks.len(),
            "store opened"
        );
        Ok(Self {
            path: Some(path),
            doc,
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            doc: StoreDoc::default(),
        }
    }

    /// Backing file, `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self) -> StoreResult<()> {
        self.write(&self.doc)
    }

    /// Write `doc` via tmp file + rename, so readers never see a partial file.
    fn write(&self, doc: &StoreDoc) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(doc).map_err(|source| StoreError::Serde {
            path: path.clone(),
            source,
        })?;
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Apply `change` to a copy of the document and keep the copy only once it is on disk.
    ///
    /// A failed change or a failed write leaves the in-memory state untouched.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut StoreDoc) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut draft = self.doc.clone();
        let out = change(&mut draft)?;
        self.write(&draft)?;
        self.doc = draft;
        Ok(out)
    }

    // ---- users ----

    pub fn register_user(
        &mut self,
        username: &str,
        email: &str,
        timezone: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<UserProfile> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
            return Err(StoreError::validation(format!(
                "username must be between 1 and {MAX_USERNAME_LEN} characters"
            )));
        }
        if !email.contains('@') || email.chars().count() > MAX_EMAIL_LEN {
            return Err(StoreError::validation(format!("invalid email address: {email}")));
        }
        parse_tz(timezone)?;

        if self.doc.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Duplicate(format!("username '{username}' is taken")));
        }
        if self
            .doc
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(StoreError::Duplicate(format!("email '{email}' is already registered")));
        }

        let user = self.commit(|doc| {
            let id = doc.next_user_id;
            doc.next_user_id += 1;
            let user = UserProfile::new(id, username, email, timezone.trim(), now);
            doc.users.push(user.clone());
            Ok(user)
        })?;

        info!(user = user.id, username, timezone, "user registered");
        Ok(user)
    }

    pub fn users(&self) -> &[UserProfile] {
        &self.doc.users
    }

    pub fn user(&self, id: u64) -> StoreResult<&UserProfile> {
        self.doc.user(id)
    }

    pub fn user_by_name(&self, username: &str) -> StoreResult<&UserProfile> {
        self.doc
            .users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(|| StoreError::NotFound(format!("user '{username}'")))
    }

    /// Change the profile zone. Existing deadlines are stored and do not move.
    pub fn set_timezone(&mut self, user_id: u64, timezone: &str) -> StoreResult<()> {
        parse_tz(timezone)?;
        self.commit(|doc| {
            doc.user_mut(user_id)?.timezone = timezone.trim().to_string();
            Ok(())
        })?;
        info!(user = user_id, timezone, "timezone updated");
        Ok(())
    }

    pub fn set_daily_goal(&mut self, user_id: u64, goal: u32) -> StoreResult<()> {
        if goal == 0 {
            return Err(StoreError::validation("daily goal must be at least 1"));
        }
        self.commit(|doc| {
            doc.user_mut(user_id)?.daily_goal = goal;
            Ok(())
        })
    }

    pub fn touch_login(&mut self, user_id: u64, now: DateTime<Utc>) -> StoreResult<()> {
        self.commit(|doc| {
            doc.user_mut(user_id)?.last_login = Some(now);
            Ok(())
        })
    }

    /// Daily streak check without a completion (dashboard visit). Writes only on change.
    pub fn refresh_streak(&mut self, user_id: u64, now: DateTime<Utc>) -> StoreResult<()> {
        let user = self.doc.user(user_id)?;
        let tz = user.tz()?;
        let done_today = completed_on_day(self.doc.owned(user_id), now, tz);

        let mut streak = user.streak.clone();
        streak.record_day(local_date(now, tz), done_today > 0);
        if streak == user.streak {
            return Ok(());
        }

        self.commit(|doc| {
            doc.user_mut(user_id)?.streak = streak;
            Ok(())
        })?;
        debug!(user = user_id, "streak refreshed");
        Ok(())
    }

    // ---- tasks ----

    /// All tasks of a user, archived included, in creation order.
    pub fn tasks_of(&self, user_id: u64) -> Vec<Task> {
        self.doc.owned(user_id).cloned().collect()
    }

    pub fn create_task(
        &mut self,
        user_id: u64,
        new: NewTask,
        now: DateTime<Utc>,
    ) -> StoreResult<Task> {
        let timezone = self.doc.user(user_id)?.timezone.clone();
        new.check_form_limits()?;
        let recurrence = new.recurrence.map(|r| r.validate()).transpose()?;

        let mut task = Task::create(
            self.doc.next_task_id,
            user_id,
            new.title,
            now,
            new.window,
            new.window_value,
            &timezone,
        )?
        .with_priority(new.priority)
        .with_tags(new.tags);
        if let Some(d) = new.description {
            task = task.with_description(d);
        }
        if let Some(r) = recurrence {
            task = task.with_recurrence(r);
        }

        let task = self.commit(|doc| {
            doc.next_task_id = task.id + 1;
            doc.tasks.push(task.clone());
            Ok(task)
        })?;

        info!(
            user = user_id,
            task = task.id,
            window = %task.window,
            deadline = %task.deadline.to_rfc3339(),
            "task created"
        );
        Ok(task)
    }

    /// A task owned by `user_id`.
    pub fn task_for(&self, user_id: u64, task_id: u64) -> StoreResult<&Task> {
        let idx = self.doc.task_index_for(user_id, task_id)?;
        Ok(&self.doc.tasks[idx])
    }

    /// Filtered tasks, upcoming deadlines first.
    pub fn list_tasks(
        &self,
        user_id: u64,
        filter: StatusFilter,
        now: DateTime<Utc>,
    ) -> Vec<&Task> {
        let mut out: Vec<&Task> = self
            .doc
            .owned(user_id)
            .filter(|t| filter.matches(t, now))
            .collect();
        out.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.id.cmp(&b.id)));
        out
    }

    pub fn update_task(&mut self, user_id: u64, task_id: u64, edit: TaskEdit) -> StoreResult<Task> {
        let updated = self.commit(|doc| {
            let idx = doc.task_index_for(user_id, task_id)?;
            let task = &mut doc.tasks[idx];

            if let Some(title) = edit.title {
                task.title = cadence_core::task::validate_title(title)?;
            }
            if let Some(description) = edit.description {
                task.description = if description.trim().is_empty() {
                    None
                } else {
                    Some(description)
                };
            }
            if let Some(priority) = edit.priority {
                task.priority = priority;
            }
            if let Some(tags) = edit.tags {
                task.tags = tags;
            }
            Ok(task.clone())
        })?;

        debug!(user = user_id, task = task_id, "task updated");
        Ok(updated)
    }

    /// Mark a task complete at `now`.
    ///
    /// Also bumps the owner's counters and streak, awards achievements and spawns the next
    /// instance of a recurring task. A task spawns at most one successor, so completing it
    /// again after a reopen does not fork the series.
    pub fn complete_task(
        &mut self,
        user_id: u64,
        task_id: u64,
        now: DateTime<Utc>,
    ) -> StoreResult<CompletionOutcome> {
        let outcome = self.commit(|doc| {
            let tz = doc.user(user_id)?.tz()?;
            let idx = doc.task_index_for(user_id, task_id)?;

            let completion = complete_task(&doc.tasks[idx], now)?;
            doc.tasks[idx].apply_completion(completion);
            let mut task = doc.tasks[idx].clone();

            let timing = match task.next_id {
                Some(_) => None,
                None => next_instance(&task, now)?,
            };
            let next = timing.map(|timing| {
                let id = doc.next_task_id;
                doc.next_task_id += 1;
                Task {
                    id,
                    created_at: timing.created_at,
                    deadline: timing.deadline,
                    completed_at: None,
                    completion_quality: None,
                    archived: false,
                    parent_id: Some(task.parent_id.unwrap_or(task.id)),
                    next_id: None,
                    ..task.clone()
                }
            });
            if let Some(spawned) = &next {
                doc.tasks[idx].next_id = Some(spawned.id);
                task.next_id = Some(spawned.id);
                doc.tasks.push(spawned.clone());
            }

            let done_today = completed_on_day(doc.owned(user_id), now, tz) as u32;
            let user = doc.user_mut(user_id)?;
            user.total_completed += 1;
            user.streak.record_day(local_date(now, tz), true);
            let new_achievements = user.award_achievements(done_today, now);

            Ok(CompletionOutcome {
                task,
                next_instance: next,
                new_achievements,
            })
        })?;

        info!(
            user = user_id,
            task = task_id,
            quality = ?outcome.task.completion_quality,
            spawned = outcome.next_instance.as_ref().map(|t| t.id),
            "task completed"
        );
        Ok(outcome)
    }

    /// Reopen a completed task. Its deadline is never recomputed.
    pub fn reopen_task(
        &mut self,
        user_id: u64,
        task_id: u64,
        now: DateTime<Utc>,
    ) -> StoreResult<Task> {
        let task = self.commit(|doc| {
            let idx = doc.task_index_for(user_id, task_id)?;
            doc.tasks[idx].reopen()?;
            let task = doc.tasks[idx].clone();

            let user = doc.user_mut(user_id)?;
            user.total_completed = user.total_completed.saturating_sub(1);
            Ok(task)
        })?;

        info!(
            user = user_id,
            task = task_id,
            status = %task.status(now),
            "task reopened"
        );
        Ok(task)
    }

    /// Soft delete.
    pub fn archive_task(&mut self, user_id: u64, task_id: u64) -> StoreResult<Task> {
        let task = self.commit(|doc| {
            let idx = doc.task_index_for(user_id, task_id)?;
            doc.tasks[idx].archived = true;
            Ok(doc.tasks[idx].clone())
        })?;
        info!(user = user_id, task = task_id, "task archived");
        Ok(task)
    }
}
