//! pvpmeta CLI - runs leaderboard sync cycles and popularity aggregation.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use console::Term;
use pvpmeta::sync::logger;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::commands::season::SeasonAction;
use crate::commands::sync::SyncArgs;

#[derive(Parser)]
#[command(name = "pvpmeta")]
#[command(version)]
#[command(about = "PvP leaderboard sync and gear popularity aggregation")]
#[command(
    long_about = "pvpmeta mirrors the rated PvP leaderboards of the game API into a local \
database, enriches the top characters with their equipment and talents, and aggregates \
item, enchant and gem popularity per bracket and specialization."
)]
#[command(after_long_help = r#"EXAMPLES
    Create the schema and register the current season:
        $ pvpmeta migrate up
        $ pvpmeta season set 40 --name "Season 3"

    Run one full sync cycle:
        $ pvpmeta sync

    Sync Europe only, without rebuilding popularity:
        $ pvpmeta sync --regions eu --skip-aggregation

    Rebuild popularity over the top 500 per spec:
        $ pvpmeta aggregate --top-n 500

CONFIGURATION
    pvpmeta reads configuration from:
      1. ~/.config/pvpmeta/config.toml (or $XDG_CONFIG_HOME/pvpmeta/config.toml)
      2. ./pvpmeta.toml
      3. Environment variables (PVPMETA_* prefix, e.g., PVPMETA_BLIZZARD_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    PVPMETA_DATABASE_URL      Database connection string (default: ~/.local/state/pvpmeta/pvpmeta.db)
    PVPMETA_BLIZZARD_TOKEN    Game API access token
    PVPMETA_SYNC_REGIONS      Regions to sync, comma separated (default: us,eu)
    RUST_LOG                  Log filter (default: pvpmeta=info,pvpmeta_cli=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Manage the season being synced
    Season {
        #[command(subcommand)]
        action: SeasonAction,
    },
    /// Run one sync cycle for the current season
    Sync(SyncArgs),
    /// Rebuild the item, enchant and gem popularity tables
    Aggregate {
        /// Season id as used by the game API (default: current season)
        #[arg(short, long)]
        season: Option<i64>,

        /// Characters per (bracket, spec) to count (default from config or 1000)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },
    /// Fetch icons for items that don't have one yet
    Items {
        /// Region whose API client is used (default: first configured region)
        #[arg(short, long)]
        region: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

/// Console logging when not attached to a TTY, plus the `pvp_sync` file log.
fn init_tracing(sync_log: Option<&Path>) -> std::io::Result<()> {
    let console = (!Term::stdout().is_term()).then(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pvpmeta=info,pvpmeta_cli=info"));
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
    });

    let sync_file = match sync_log {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_level(false)
                    .with_timer(ChronoLocal::new("[%Y-%m-%d %H:%M:%S]".to_string()))
                    .with_filter(Targets::new().with_target(logger::TARGET, Level::INFO)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(sync_file)
        .init();
    Ok(())
}

/// Create the parent directory of a `sqlite://` database file.
fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let db_path = db_path.split('?').next().unwrap_or(db_path);
    let db_path = Path::new(db_path);

    if db_path.is_relative() && !db_path.as_os_str().is_empty() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory. \
             Consider using an absolute path.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let sync_log = matches!(cli.command, Commands::Sync(_))
        .then(|| config.sync_log_path())
        .flatten();
    init_tracing(sync_log.as_deref())?;

    shutdown::setup_shutdown_handler();

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL. Set PVPMETA_DATABASE_URL.")?;
    ensure_sqlite_dir(&database_url)?;

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Season { action } => {
            commands::season::handle_season(action, &config, &database_url).await?;
        }
        Commands::Sync(args) => {
            commands::sync::handle_sync(args, &config, &database_url).await?;
        }
        Commands::Aggregate { season, top_n } => {
            commands::aggregate::handle_aggregate(season, top_n, &config, &database_url).await?;
        }
        Commands::Items { region } => {
            commands::items::handle_items(region, &config, &database_url).await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
