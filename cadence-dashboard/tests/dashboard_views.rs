use cadence_core::{Priority, Task, TaskStatus, UserProfile, WindowType, complete_task};
use cadence_dashboard::{daily_view, home_view, monthly_view, trend_series, weekly_view};
use chrono::{DateTime, Duration, TimeZone, Utc};

const TZ: &str = "America/Chicago";

fn at(m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, m, d, h, min, 0).unwrap()
}

/// Thursday 2026-01-15, noon in Chicago.
fn now() -> DateTime<Utc> {
    at(1, 15, 18, 0)
}

fn user() -> UserProfile {
    UserProfile::new(1, "sam", "sam@example.com", TZ, at(1, 1, 0, 0))
}

fn task(id: u64, created: DateTime<Utc>, window: WindowType, days: Option<i64>) -> Task {
    Task::create(id, 1, format!("task {id}"), created, window, days, TZ).unwrap()
}

fn fixture() -> Vec<Task> {
    let open_daily = task(1, at(1, 15, 14, 0), WindowType::Daily, None);

    let mut done_daily =
        task(2, at(1, 15, 14, 30), WindowType::Daily, None).with_priority(Priority::High);
    done_daily.apply_completion(complete_task(&done_daily, at(1, 15, 16, 0)).unwrap());

    let overdue_weekly = task(3, at(1, 5, 18, 0), WindowType::Weekly, None);
    let at_risk_custom = task(4, at(1, 6, 18, 0), WindowType::Custom, Some(10));
    let monthly = task(5, at(1, 14, 9, 0), WindowType::Monthly, None);

    let mut archived = task(6, at(1, 15, 15, 0), WindowType::Daily, None);
    archived.archived = true;

    vec![open_daily, done_daily, overdue_weekly, at_risk_custom, monthly, archived]
}

#[test]
fn home_view_counts_and_lists() {
    let tasks = fixture();
    let home = home_view(&user(), &tasks, now()).unwrap();

    assert_eq!(home.date.to_string(), "2026-01-15");
    assert_eq!(
        (home.active_count, home.at_risk_count, home.overdue_count),
        (2, 1, 1)
    );

    assert_eq!(home.today.total, 2);
    assert_eq!(home.today.completed_on_time, 1);
    assert_eq!(home.today.completion_rate, 0.5);
    assert_eq!(home.week.total, 3);
    assert_eq!(home.week.overdue, 1);
    assert_eq!(home.month.total, 4);

    let upcoming: Vec<u64> = home.upcoming.iter().map(|c| c.id).collect();
    assert_eq!(upcoming, vec![1, 4, 5]);
    assert_eq!(home.upcoming[1].status, TaskStatus::AtRisk);

    let recent: Vec<u64> = home.recent_completed.iter().map(|c| c.id).collect();
    assert_eq!(recent, vec![2]);

    assert_eq!(home.progress.completed, 1);
    assert_eq!(home.progress.goal, 3);
}

#[test]
fn daily_view_puts_high_priority_first() {
    let tasks = fixture();
    let daily = daily_view(&user(), &tasks, now()).unwrap();
    let ids: Vec<u64> = daily.tasks.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(daily.stats.on_time_rate, 50.0);
}

#[test]
fn weekly_and_monthly_views() {
    let tasks = fixture();

    let weekly = weekly_view(&user(), &tasks, now()).unwrap();
    assert_eq!(weekly.start_date.to_string(), "2026-01-09");
    assert_eq!(weekly.trend.len(), 7);
    assert_eq!(weekly.trend[0].label, "Fri");
    let last = weekly.trend.last().unwrap();
    assert_eq!((last.created, last.completed), (3, 1));
    let ids: Vec<u64> = weekly.tasks.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);

    let monthly = monthly_view(&user(), &tasks, now()).unwrap();
    assert_eq!(monthly.month, "January 2026");
    assert_eq!(monthly.trend.len(), 30);
    assert_eq!(monthly.stats.total, 4);
}

#[test]
fn trend_series_for_charts() {
    let tasks = fixture();
    let series = trend_series(&user(), &tasks, 7, now()).unwrap();
    assert_eq!(series.labels.len(), 7);
    assert_eq!(series.created.len(), 7);
    assert_eq!(series.labels.last().map(String::as_str), Some("Thu"));

    let json = serde_json::to_value(&series).unwrap();
    assert!(json.get("labels").is_some());
    assert!(json.get("completed").is_some());
}

#[test]
fn empty_dashboard_has_zero_rates() {
    let home = home_view(&user(), &[], now()).unwrap();
    assert_eq!(home.today.total, 0);
    assert_eq!(home.today.completion_rate, 0.0);
    assert!(home.upcoming.is_empty());
    assert_eq!(home.progress.percentage, 0.0);
}

#[test]
fn statuses_are_recomputed_per_call() {
    let tasks = fixture();
    let later = now() + Duration::days(2);
    let home = home_view(&user(), &tasks, later).unwrap();
    // tasks 1 and 4 have now slipped past their deadlines
    assert_eq!(home.overdue_count, 3);
    assert_eq!(home.active_count, 1);
}

#[test]
fn bad_profile_timezone_is_an_error() {
    let mut u = user();
    u.timezone = "Atlantis/Capital".into();
    assert!(home_view(&u, &fixture(), now()).unwrap_err().is_validation());
}
