use clap::Subcommand;
use console::style;
use pvpmeta::repository::leaderboard;

use crate::commands::shared::{connect, resolve_season};
use crate::config::Config;

#[derive(Subcommand)]
pub enum SeasonAction {
    /// Register a season and make it the one synced
    Set {
        /// Season id as used by the game API
        id: i64,

        /// Display name (default: "Season <ID>")
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the current season
    Show,
}

pub(crate) async fn handle_season(
    action: SeasonAction,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect(config, database_url).await?;

    match action {
        SeasonAction::Set { id, name } => {
            let name = name.unwrap_or_else(|| format!("Season {}", id));
            let season = leaderboard::upsert_season(db.as_ref(), id, &name).await?;
            leaderboard::set_current_season(db.as_ref(), season.id).await?;
            println!(
                "{} {} ({}) is now the current season",
                style("✓").green().bold(),
                style(&season.display_name).cyan(),
                season.blizzard_id
            );
        }
        SeasonAction::Show => {
            let season = resolve_season(&db, None).await?;
            println!(
                "{} ({}), current since {}",
                style(&season.display_name).cyan(),
                season.blizzard_id,
                season.updated_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}
