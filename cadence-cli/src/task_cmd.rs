use anyhow::Result;
use cadence_core::{Priority, RecurrencePattern, Task, WindowType, parse_tags};
use cadence_dashboard::{TaskCard, task_card};
use cadence_store::{NewTask, StatusFilter, Store, TaskEdit};
use chrono::Utc;
use chrono_tz::Tz;
use clap::Subcommand;

use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task; its deadline is fixed from now and the window
    Add {
        title: String,

        /// daily | weekly | monthly | custom
        #[arg(long, default_value = "daily")]
        window: WindowType,

        /// Day count for --window custom
        #[arg(long)]
        days: Option<i64>,

        /// low | medium | high
        #[arg(long, default_value = "medium")]
        priority: Priority,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Spawn a follow-up when completed: daily | weekly | monthly
        #[arg(long)]
        repeat: Option<RecurrencePattern>,

        /// Recurrence interval in pattern units
        #[arg(long, default_value_t = 1)]
        every: u32,
    },

    /// List tasks (default: open ones)
    List {
        /// active | overdue | completed | archived | all
        #[arg(long, default_value = "active")]
        status: StatusFilter,

        /// Max rows (default: config.display.tasks_per_page)
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show one task
    Show {
        id: u64,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Edit title, description, priority or tags (the deadline never moves)
    Edit {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        tags: Option<String>,
    },

    /// Mark a task complete
    Complete { id: u64 },

    /// Undo a completion
    Reopen { id: u64 },

    /// Hide a task from lists and stats
    Archive { id: u64 },
}

pub fn run(cmd: TaskCommand, store: &mut Store, user_id: u64, cfg: &Config) -> Result<()> {
    let now = Utc::now();
    let tz = store.user(user_id)?.tz()?;

    match cmd {
        TaskCommand::Add {
            title,
            window,
            days,
            priority,
            tags,
            description,
            repeat,
            every,
        } => {
            let mut new = NewTask::new(title, window).with_priority(priority);
            if let Some(d) = days {
                new = new.with_days(d);
            }
            if let Some(t) = tags {
                new = new.with_tags(parse_tags(&t));
            }
            if let Some(d) = description {
                new = new.with_description(d);
            }
            if let Some(pattern) = repeat {
                new = new.recurring(pattern, every);
            }

            let task = store.create_task(user_id, new, now)?;
            println!(
                "Created #{} \"{}\" ({}), due {}",
                task.id,
                task.title,
                task.window.describe(task.window_value),
                cadence_core::time::format_local(task.deadline, tz)
            );
        }

        TaskCommand::List {
            status,
            limit,
            json,
        } => {
            let limit = limit.unwrap_or(cfg.display.tasks_per_page);
            let cards: Vec<TaskCard> = store
                .list_tasks(user_id, status, now)
                .into_iter()
                .take(limit)
                .map(|t| task_card(t, now, tz))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else if cards.is_empty() {
                println!("No {status} tasks.");
            } else {
                for c in &cards {
                    print_row(c);
                }
            }
        }

        TaskCommand::Show { id, json } => {
            let task = store.task_for(user_id, id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(task)?);
            } else {
                print_detail(task, now, tz);
            }
        }

        TaskCommand::Edit {
            id,
            title,
            description,
            priority,
            tags,
        } => {
            let edit = TaskEdit {
                title,
                description,
                priority,
                tags: tags.map(|t| parse_tags(&t)),
            };
            if edit.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            let task = store.update_task(user_id, id, edit)?;
            println!("Updated #{} \"{}\"", task.id, task.title);
        }

        TaskCommand::Complete { id } => {
            let out = store.complete_task(user_id, id, now)?;
            let quality = out
                .task
                .completion_quality
                .map(|q| q.as_str())
                .unwrap_or("on_time");
            println!("Task \"{}\" completed! ({})", out.task.title, quality);

            if let Some(next) = &out.next_instance {
                println!(
                    "Next instance #{} due {}",
                    next.id,
                    cadence_core::time::format_local(next.deadline, tz)
                );
            }
            for a in &out.new_achievements {
                println!("{} Achievement unlocked: {} ({})", a.icon, a.name, a.description);
            }
        }

        TaskCommand::Reopen { id } => {
            let task = store.reopen_task(user_id, id, now)?;
            println!(
                "Task \"{}\" marked as {}",
                task.title,
                task.status(now).as_str()
            );
        }

        TaskCommand::Archive { id } => {
            let task = store.archive_task(user_id, id)?;
            println!("Task \"{}\" archived.", task.title);
        }
    }

    Ok(())
}

pub fn print_row(c: &TaskCard) {
    let tags = if c.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", c.tags.join(", "))
    };
    println!(
        "[{:<9}] #{:<4} {:<6} {} | {} | due {} | {}{}",
        c.status.as_str(),
        c.id,
        c.priority.as_str(),
        c.title,
        c.window_label,
        c.deadline_local,
        c.time_remaining,
        tags
    );
}

fn print_detail(task: &Task, now: chrono::DateTime<Utc>, tz: Tz) {
    println!("# {} (#{})\n", task.title, task.id);
    if let Some(d) = &task.description {
        println!("{}\n", d);
    }
    println!("Status:    {}", task.status(now).as_str());
    println!("Window:    {}", task.window.describe(task.window_value));
    println!("Priority:  {}", task.priority.as_str());
    println!("Created:   {}", cadence_core::time::format_local(task.created_at, tz));
    println!("Deadline:  {}", cadence_core::time::format_local(task.deadline, tz));
    println!("Remaining: {}", task.time_remaining(now));
    if let Some(done) = task.completed_at {
        println!("Completed: {}", cadence_core::time::format_local(done, tz));
    }
    if let Some(q) = task.completion_quality {
        println!("Quality:   {}", q.as_str());
    }
    if !task.tags.is_empty() {
        println!("Tags:      {}", task.tags.join(", "));
    }
    if let Some(r) = &task.recurrence {
        println!("Repeats:   every {} {}", r.interval, r.pattern.as_str());
    }
    if task.archived {
        println!("(archived)");
    }
}
