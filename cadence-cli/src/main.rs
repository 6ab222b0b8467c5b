use anyhow::{Context, Result, bail};
use cadence_core::MAX_TREND_DAYS;
use cadence_store::Store;
use clap::{Parser, Subcommand};

mod api;
mod config;
mod dashboard_cmd;
mod logging;
mod state;
mod task_cmd;
mod user_cmd;

use config::Config;
use dashboard_cmd::View;
use task_cmd::TaskCommand;
use user_cmd::UserCommand;

#[derive(Parser, Debug)]
#[command(name = "cadence", version, about = "Deadline-driven task tracker")]
struct Cli {
    /// Act as this user (default: config.defaults.user, or the only registered user)
    #[arg(long, global = true, env = "CADENCE_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.cadence/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Register and manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Create, list and complete tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Progress dashboard (statuses are computed at call time)
    Dashboard {
        #[arg(value_enum, default_value_t = View::Home)]
        view: View,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Created/completed counts per local day
    Trend {
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TREND_DAYS))
        )]
        days: u32,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Serve the JSON HTTP API
    Serve {
        /// Listen address (default: config.server.bind)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    logging::init(&cfg.log.level);

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}\n", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },

        Command::User { command } => {
            let mut store = open_store(&cfg)?;
            user_cmd::run(command, &mut store, &cfg, cli.user.as_deref())?;
        }

        Command::Task { command } => {
            let mut store = open_store(&cfg)?;
            let user_id = resolve_user(&store, &cfg, cli.user.as_deref())?;
            task_cmd::run(command, &mut store, user_id, &cfg)?;
        }

        Command::Dashboard { view, json } => {
            let mut store = open_store(&cfg)?;
            let user_id = resolve_user(&store, &cfg, cli.user.as_deref())?;
            dashboard_cmd::run(&mut store, user_id, view, json)?;
        }

        Command::Trend { days, json } => {
            let store = open_store(&cfg)?;
            let user_id = resolve_user(&store, &cfg, cli.user.as_deref())?;
            dashboard_cmd::trend(&store, user_id, days, json)?;
        }

        Command::Serve { bind } => {
            let store = open_store(&cfg)?;
            let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
            api::serve(store, &bind).await?;
        }
    }

    Ok(())
}

fn open_store(cfg: &Config) -> Result<Store> {
    let dir = state::data_dir(cfg.store.data_dir.as_ref())?;
    Store::open(&dir).with_context(|| format!("opening store in {}", dir.display()))
}

/// `--user`, then `config.defaults.user`, then the sole registered user.
pub(crate) fn resolve_user(store: &Store, cfg: &Config, flag: Option<&str>) -> Result<u64> {
    if let Some(name) = flag.or(cfg.defaults.user.as_deref()) {
        return Ok(store.user_by_name(name)?.id);
    }
    match store.users() {
        [only] => Ok(only.id),
        [] => bail!("No users yet. Run: cadence user add <name> --email <addr>"),
        _ => bail!("Several users exist; pass --user <name> or set defaults.user in config"),
    }
}
