//! Dashboard views.
//!
//! Every view is a pure function of the user, their tasks and `now`; statuses are
//! recomputed on each call rather than read from storage.

use cadence_core::achievements;
use cadence_core::{
    DailyProgress, EngineResult, Period, PeriodStats, Task, TaskStatus, TrendPoint, UserProfile,
    aggregate, completed_on_day, daily_trend, local_date,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::card::{TaskCard, task_card};

const UPCOMING_LIMIT: usize = 5;
const RECENT_LIMIT: usize = 5;
const RECENT_ACHIEVEMENTS: usize = 3;
const WEEKLY_TREND_DAYS: u32 = 7;
const MONTHLY_TREND_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementBadge {
    pub key: String,
    pub name: String,
    pub icon: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub date: NaiveDate,
    pub today: PeriodStats,
    pub week: PeriodStats,
    pub month: PeriodStats,
    pub active_count: usize,
    pub at_risk_count: usize,
    pub overdue_count: usize,
    pub upcoming: Vec<TaskCard>,
    pub recent_completed: Vec<TaskCard>,
    pub streak: u32,
    pub longest_streak: u32,
    pub streak_freezes: u32,
    pub progress: DailyProgress,
    pub recent_achievements: Vec<AchievementBadge>,
    pub total_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyView {
    pub date: NaiveDate,
    pub tasks: Vec<TaskCard>,
    pub stats: PeriodStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyView {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tasks: Vec<TaskCard>,
    pub stats: PeriodStats,
    pub trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyView {
    /// e.g. "January 2026"
    pub month: String,
    pub tasks: Vec<TaskCard>,
    pub stats: PeriodStats,
    pub trend: Vec<TrendPoint>,
}

/// Parallel arrays for chart endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub created: Vec<usize>,
    pub completed: Vec<usize>,
}

fn live(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    tasks.iter().filter(|t| !t.archived)
}

fn due_in(tasks: &[Task], period: &Period, tz: Tz, now: DateTime<Utc>) -> Vec<TaskCard> {
    let mut due: Vec<&Task> = live(tasks).filter(|t| period.contains(t.deadline)).collect();
    due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.id.cmp(&b.id)));
    due.into_iter().map(|t| task_card(t, now, tz)).collect()
}

pub fn home_view(user: &UserProfile, tasks: &[Task], now: DateTime<Utc>) -> EngineResult<HomeView> {
    let tz = user.tz()?;
    let today = local_date(now, tz);

    let (mut active, mut at_risk, mut overdue) = (0, 0, 0);
    for t in live(tasks) {
        match t.status(now) {
            TaskStatus::Active => active += 1,
            TaskStatus::AtRisk => at_risk += 1,
            TaskStatus::Overdue => overdue += 1,
            TaskStatus::Completed => {}
        }
    }

    let mut upcoming: Vec<&Task> = live(tasks).filter(|t| t.status(now).is_open()).collect();
    upcoming.sort_by(|a, b| a.deadline.cmp(&b.deadline));
    upcoming.truncate(UPCOMING_LIMIT);

    let mut recent: Vec<&Task> = live(tasks).filter(|t| t.is_completed()).collect();
    recent.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    recent.truncate(RECENT_LIMIT);

    let recent_achievements = user
        .recent_achievements(RECENT_ACHIEVEMENTS)
        .into_iter()
        .filter_map(|earned| {
            achievements::find(&earned.key).map(|a| AchievementBadge {
                key: a.key.to_string(),
                name: a.name.to_string(),
                icon: a.icon.to_string(),
                earned_at: earned.earned_at,
            })
        })
        .collect();

    Ok(HomeView {
        date: today,
        today: aggregate(tasks, &Period::day(today, tz), now),
        week: aggregate(tasks, &Period::week_ending(today, tz), now),
        month: aggregate(tasks, &Period::month_of(today, tz), now),
        active_count: active,
        at_risk_count: at_risk,
        overdue_count: overdue,
        upcoming: upcoming.into_iter().map(|t| task_card(t, now, tz)).collect(),
        recent_completed: recent.into_iter().map(|t| task_card(t, now, tz)).collect(),
        streak: user.streak.current,
        longest_streak: user.streak.longest,
        streak_freezes: user.streak.freezes,
        progress: DailyProgress::new(completed_on_day(tasks, now, tz), user.daily_goal),
        recent_achievements,
        total_completed: user.total_completed,
    })
}

/// Tasks due today, high priority first, then by deadline.
pub fn daily_view(
    user: &UserProfile,
    tasks: &[Task],
    now: DateTime<Utc>,
) -> EngineResult<DailyView> {
    let tz = user.tz()?;
    let today = local_date(now, tz);
    let period = Period::day(today, tz);

    let mut due: Vec<&Task> = live(tasks).filter(|t| period.contains(t.deadline)).collect();
    due.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.deadline.cmp(&b.deadline)));

    Ok(DailyView {
        date: today,
        tasks: due.into_iter().map(|t| task_card(t, now, tz)).collect(),
        stats: aggregate(tasks, &period, now),
    })
}

pub fn weekly_view(
    user: &UserProfile,
    tasks: &[Task],
    now: DateTime<Utc>,
) -> EngineResult<WeeklyView> {
    let tz = user.tz()?;
    let today = local_date(now, tz);
    let period = Period::week_ending(today, tz);

    Ok(WeeklyView {
        start_date: period.start,
        end_date: period.end,
        tasks: due_in(tasks, &period, tz, now),
        stats: aggregate(tasks, &period, now),
        trend: daily_trend(tasks, today, WEEKLY_TREND_DAYS, tz),
    })
}

pub fn monthly_view(
    user: &UserProfile,
    tasks: &[Task],
    now: DateTime<Utc>,
) -> EngineResult<MonthlyView> {
    let tz = user.tz()?;
    let today = local_date(now, tz);
    let period = Period::month_of(today, tz);

    Ok(MonthlyView {
        month: period.month_label(),
        tasks: due_in(tasks, &period, tz, now),
        stats: aggregate(tasks, &period, now),
        trend: daily_trend(tasks, today, MONTHLY_TREND_DAYS, tz),
    })
}

pub fn trend_series(
    user: &UserProfile,
    tasks: &[Task],
    days: u32,
    now: DateTime<Utc>,
) -> EngineResult<TrendSeries> {
    let tz = user.tz()?;
    let points = daily_trend(tasks, local_date(now, tz), days, tz);
    Ok(TrendSeries {
        labels: points.iter().map(|p| p.label.clone()).collect(),
        created: points.iter().map(|p| p.created).collect(),
        completed: points.iter().map(|p| p.completed).collect(),
    })
}
