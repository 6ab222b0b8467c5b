//! cadence-dashboard: progress views over a user's tasks (home, daily, weekly, monthly).

pub mod card;
pub mod views;

pub use card::{TaskCard, task_card};
pub use views::{
    AchievementBadge, DailyView, HomeView, MonthlyView, TrendSeries, WeeklyView, daily_view,
    home_view, monthly_view, trend_series, weekly_view,
};
