use anyhow::Result;
use cadence_core::{PeriodStats, TrendPoint};
use cadence_dashboard::{
    DailyView, HomeView, MonthlyView, TaskCard, WeeklyView, daily_view, home_view, monthly_view,
    trend_series, weekly_view,
};
use cadence_store::Store;
use chrono::Utc;
use clap::ValueEnum;

use crate::task_cmd::print_row;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum View {
    #[default]
    Home,
    Daily,
    Weekly,
    Monthly,
}

pub fn run(store: &mut Store, user_id: u64, view: View, json: bool) -> Result<()> {
    let now = Utc::now();
    store.refresh_streak(user_id, now)?;
    let user = store.user(user_id)?;
    let tasks = store.tasks_of(user_id);

    match view {
        View::Home => {
            let v = home_view(user, &tasks, now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                print_home(&user.username, &v);
            }
        }
        View::Daily => {
            let v = daily_view(user, &tasks, now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                print_daily(&v);
            }
        }
        View::Weekly => {
            let v = weekly_view(user, &tasks, now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                print_weekly(&v);
            }
        }
        View::Monthly => {
            let v = monthly_view(user, &tasks, now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                print_monthly(&v);
            }
        }
    }

    Ok(())
}

pub fn trend(store: &Store, user_id: u64, days: u32, json: bool) -> Result<()> {
    let now = Utc::now();
    let series = trend_series(store.user(user_id)?, &store.tasks_of(user_id), days, now)?;

    if json {
        println!("{}", serde_json::to_string(&series)?);
        return Ok(());
    }

    println!("# Last {} days (created / completed)\n", days);
    for ((label, created), completed) in series
        .labels
        .iter()
        .zip(&series.created)
        .zip(&series.completed)
    {
        println!("{:<4} {:>3} / {:<3} {}", label, created, completed, "#".repeat(*completed));
    }
    Ok(())
}

fn stats_line(label: &str, s: &PeriodStats) -> String {
    format!(
        "{:<8} {:>3} due | {:>3} on time | {:>3} late | {:>3} overdue | {:>5.1}% on time",
        label, s.total, s.completed_on_time, s.completed_late, s.overdue, s.on_time_rate
    )
}

fn print_cards(title: &str, cards: &[TaskCard]) {
    println!("\n## {} ({})\n", title, cards.len());
    if cards.is_empty() {
        println!("(none)");
    }
    for c in cards {
        print_row(c);
    }
}

fn print_trend(points: &[TrendPoint]) {
    println!("\n## Trend\n");
    for p in points {
        println!("{} {:<4} +{:<3} done {}", p.date, p.label, p.created, p.completed);
    }
}

fn print_home(username: &str, v: &HomeView) {
    println!("# Dashboard for {} ({})\n", username, v.date);
    println!(
        "Open: {} active, {} at risk, {} overdue",
        v.active_count, v.at_risk_count, v.overdue_count
    );
    println!(
        "Today: {}/{} completed ({:.0}%){}",
        v.progress.completed,
        v.progress.goal,
        v.progress.percentage,
        if v.progress.goal_reached() { " - goal reached" } else { "" }
    );
    println!(
        "Streak: {} days (longest {}, freezes {}) | total completed {}\n",
        v.streak, v.longest_streak, v.streak_freezes, v.total_completed
    );

    println!("{}", stats_line("Today", &v.today));
    println!("{}", stats_line("7 days", &v.week));
    println!("{}", stats_line("Month", &v.month));

    print_cards("Upcoming", &v.upcoming);
    print_cards("Recently completed", &v.recent_completed);

    if !v.recent_achievements.is_empty() {
        println!("\n## Achievements\n");
        for a in &v.recent_achievements {
            println!("{} {} ({})", a.icon, a.name, a.earned_at.format("%Y-%m-%d"));
        }
    }
}

fn print_daily(v: &DailyView) {
    println!("# Due today ({})\n", v.date);
    println!("{}", stats_line("Today", &v.stats));
    print_cards("Tasks", &v.tasks);
}

fn print_weekly(v: &WeeklyView) {
    println!("# Week {} .. {}\n", v.start_date, v.end_date);
    println!("{}", stats_line("Week", &v.stats));
    print_cards("Tasks", &v.tasks);
    print_trend(&v.trend);
}

fn print_monthly(v: &MonthlyView) {
    println!("# {}\n", v.month);
    println!("{}", stats_line("Month", &v.stats));
    print_cards("Tasks", &v.tasks);
    print_trend(&v.trend);
}
