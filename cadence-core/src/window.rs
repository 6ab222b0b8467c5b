//! Completion windows and deadline computation.
//!
//! Only `Daily` depends on the user's time zone: it snaps to the end of the local calendar day.
//! `Weekly`, `Monthly` and `Custom` are fixed offsets from the creation instant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::time::{end_of_local_day, local_date, parse_tz};

pub const WEEKLY_DAYS: i64 = 7;
/// Fixed 30 days, not calendar-month arithmetic.
pub const MONTHLY_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl WindowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowType::Daily => "daily",
            WindowType::Weekly => "weekly",
            WindowType::Monthly => "monthly",
            WindowType::Custom => "custom",
        }
    }

    /// Form label, e.g. "Weekly (7 days)".
    pub fn describe(&self, window_value: Option<i64>) -> String {
        match self {
            WindowType::Daily => "Daily (by end of day)".to_string(),
            WindowType::Weekly => "Weekly (7 days)".to_string(),
            WindowType::Monthly => "Monthly (30 days)".to_string(),
            WindowType::Custom => match window_value {
                Some(days) => format!("Custom ({days} days)"),
                None => "Custom".to_string(),
            },
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(WindowType::Daily),
            "weekly" => Ok(WindowType::Weekly),
            "monthly" => Ok(WindowType::Monthly),
            "custom" => Ok(WindowType::Custom),
            other => Err(EngineError::validation(format!(
                "unknown window type '{other}' (expected daily, weekly, monthly or custom)"
            ))),
        }
    }
}

/// Compute a task's deadline from its creation instant and window.
///
/// `tz` is validated for every window type, even though only `Daily` reads it, so a bad
/// profile surfaces at creation time instead of shifting daily deadlines later.
pub fn compute_deadline(
    created_at: DateTime<Utc>,
    window: WindowType,
    window_value: Option<i64>,
    tz: &str,
) -> EngineResult<DateTime<Utc>> {
    let tz = parse_tz(tz)?;

    match window {
        WindowType::Daily => {
            let end = end_of_local_day(local_date(created_at, tz), tz);
            // Creation inside the day's final millisecond still gets a non-empty window.
            Ok(end.max(created_at + Duration::milliseconds(1)))
        }
        WindowType::Weekly => add_days(created_at, WEEKLY_DAYS),
        WindowType::Monthly => add_days(created_at, MONTHLY_DAYS),
        WindowType::Custom => {
            let days = window_value.ok_or_else(|| {
                EngineError::validation("custom window requires a number of days")
            })?;
            if days <= 0 {
                return Err(EngineError::validation(format!(
                    "custom window days must be positive (got {days})"
                )));
            }
            add_days(created_at, days)
        }
    }
}

fn add_days(t: DateTime<Utc>, days: i64) -> EngineResult<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|d| t.checked_add_signed(d))
        .ok_or_else(|| EngineError::validation(format!("window of {days} days is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_daily_snaps_to_end_of_local_day_new_york() {
        // 2026-01-11T23:30:00-05:00
        let created = Utc.with_ymd_and_hms(2026, 1, 12, 4, 30, 0).unwrap();
        let deadline =
            compute_deadline(created, WindowType::Daily, None, "America/New_York").unwrap();
        let local = deadline.with_timezone(&chrono_tz::America::New_York);
        assert_eq!(local.to_rfc3339(), "2026-01-11T23:59:59.999-05:00");
        assert_eq!((deadline - created).num_minutes(), 29);
    }

    #[test]
    fn test_daily_in_utc_is_not_shifted() {
        let created = Utc.with_ymd_and_hms(2026, 1, 12, 4, 30, 0).unwrap();
        let deadline = compute_deadline(created, WindowType::Daily, None, "UTC").unwrap();
        assert_eq!(deadline.to_rfc3339(), "2026-01-12T23:59:59.999+00:00");
    }

    #[test]
    fn test_fixed_windows_ignore_timezone() {
        for tz in ["UTC", "America/New_York", "Asia/Kathmandu", "Pacific/Chatham"] {
            let weekly = compute_deadline(t0(), WindowType::Weekly, None, tz).unwrap();
            let monthly = compute_deadline(t0(), WindowType::Monthly, None, tz).unwrap();
            assert_eq!(weekly - t0(), Duration::hours(168));
            assert_eq!(monthly - t0(), Duration::days(30));
        }
    }

    #[test]
    fn test_monthly_is_thirty_days_not_calendar_month() {
        let feb = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let deadline = compute_deadline(feb, WindowType::Monthly, None, "UTC").unwrap();
        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_weekly_across_dst_change_is_exact_hours() {
        // US DST starts 2026-03-08; weekly stays a 168h offset.
        let created = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();
        let deadline =
            compute_deadline(created, WindowType::Weekly, None, "America/New_York").unwrap();
        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 3, 12, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_custom_window_days() {
        let deadline = compute_deadline(t0(), WindowType::Custom, Some(3), "UTC").unwrap();
        assert_eq!(deadline - t0(), Duration::days(3));
    }

    #[test]
    fn test_custom_window_rejects_missing_zero_and_negative() {
        for value in [None, Some(0), Some(-4)] {
            let err = compute_deadline(t0(), WindowType::Custom, value, "UTC").unwrap_err();
            assert!(err.is_validation(), "{value:?} should be rejected");
        }
    }

    #[test]
    fn test_custom_window_out_of_range() {
        let err = compute_deadline(t0(), WindowType::Custom, Some(i64::MAX), "UTC").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_window_value_ignored_for_fixed_windows() {
        let deadline = compute_deadline(t0(), WindowType::Weekly, Some(0), "UTC").unwrap();
        assert_eq!(deadline - t0(), Duration::days(7));
    }

    #[test]
    fn test_unknown_timezone_rejected_for_every_window() {
        for window in [WindowType::Daily, WindowType::Weekly, WindowType::Monthly] {
            let err = compute_deadline(t0(), window, None, "Not/AZone").unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_parse_window_tokens() {
        assert_eq!("daily".parse::<WindowType>().unwrap(), WindowType::Daily);
        assert_eq!(" custom ".parse::<WindowType>().unwrap(), WindowType::Custom);
        assert!("fortnightly".parse::<WindowType>().unwrap_err().is_validation());
        assert!("Daily".parse::<WindowType>().is_err());
    }

    #[test]
    fn test_deadline_is_after_creation_for_late_night_daily() {
        let created = Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap();
        let deadline = compute_deadline(created, WindowType::Daily, None, "UTC").unwrap();
        assert!(deadline > created);
    }
}
