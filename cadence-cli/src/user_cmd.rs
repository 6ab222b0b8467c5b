use anyhow::Result;
use cadence_core::{UserProfile, achievements};
use cadence_store::Store;
use chrono::Utc;
use clap::Subcommand;

use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a local user
    Add {
        username: String,

        #[arg(long)]
        email: String,

        /// IANA zone name (default: config.defaults.timezone)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// List registered users
    List,

    /// Show profile, streak and achievements
    Show {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Change the profile time zone (existing deadlines keep their instant)
    SetTimezone { timezone: String },

    /// Change the number of completions that make a good day
    SetGoal { goal: u32 },
}

/// `current` is the resolved `--user`, when one was given or configured.
pub fn run(cmd: UserCommand, store: &mut Store, cfg: &Config, current: Option<&str>) -> Result<()> {
    let now = Utc::now();

    match cmd {
        UserCommand::Add {
            username,
            email,
            timezone,
        } => {
            let tz = timezone.unwrap_or_else(|| cfg.defaults.timezone.clone());
            let user = store.register_user(&username, &email, &tz, now)?;
            if user.daily_goal != cfg.defaults.daily_goal {
                store.set_daily_goal(user.id, cfg.defaults.daily_goal)?;
            }
            println!("Registered {} (id {}, {})", user.username, user.id, user.timezone);
        }

        UserCommand::List => {
            if store.users().is_empty() {
                println!("No users yet. Run: cadence user add <name> --email <addr>");
            }
            for u in store.users() {
                println!("{:>4}  {:<20} {:<28} {}", u.id, u.username, u.email, u.timezone);
            }
        }

        UserCommand::Show { json } => {
            let id = crate::resolve_user(store, cfg, current)?;
            store.touch_login(id, now)?;
            let user = store.user(id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(user)?);
            } else {
                print_profile(user);
            }
        }

        UserCommand::SetTimezone { timezone } => {
            let id = crate::resolve_user(store, cfg, current)?;
            store.set_timezone(id, &timezone)?;
            println!("Time zone set to {}", timezone.trim());
        }

        UserCommand::SetGoal { goal } => {
            let id = crate::resolve_user(store, cfg, current)?;
            store.set_daily_goal(id, goal)?;
            println!("Daily goal set to {goal}");
        }
    }

    Ok(())
}

fn print_profile(user: &UserProfile) {
    println!("# {} <{}>\n", user.username, user.email);
    println!("Time zone:       {}", user.timezone);
    println!("Daily goal:      {}", user.daily_goal);
    println!("Completed tasks: {}", user.total_completed);
    println!(
        "Streak:          {} (longest {}, freezes left {})",
        user.streak.current, user.streak.longest, user.streak.freezes
    );

    println!(
        "\nAchievements ({}/{})",
        user.achievements.len(),
        achievements::CATALOG.len()
    );
    for earned in user.recent_achievements(usize::MAX) {
        if let Some(a) = achievements::find(&earned.key) {
            println!(
                "  {} {:<20} {}  ({})",
                a.icon,
                a.name,
                a.description,
                earned.earned_at.format("%Y-%m-%d")
            );
        }
    }
}
