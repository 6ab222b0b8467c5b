//! cadence-core: window/status engine for the Cadence task tracker.
//!
//! Everything here is pure. Callers pass `now` explicitly; nothing reads the wall clock.

pub mod achievements;
pub mod aggregate;
pub mod completion;
pub mod error;
pub mod period;
pub mod recurrence;
pub mod status;
pub mod streak;
pub mod task;
pub mod time;
pub mod user;
pub mod window;

pub use achievements::{Achievement, ProgressSnapshot, Requirement, CATALOG};
pub use aggregate::{aggregate, PeriodStats};
pub use completion::{complete_task, reopen_task, Completion, CompletionQuality};
pub use error::{EngineError, EngineResult};
pub use period::{daily_trend, Period, TrendPoint, MAX_TREND_DAYS};
pub use recurrence::{next_instance, NextInstance, Recurrence, RecurrencePattern, MAX_INTERVAL};
pub use status::{classify_status, time_remaining, TaskStatus};
pub use streak::{completed_on_day, DailyProgress, Streak};
pub use task::{parse_tags, Priority, Task};
pub use time::{local_date, parse_tz};
pub use user::{EarnedAchievement, UserProfile};
pub use window::{compute_deadline, WindowType};
