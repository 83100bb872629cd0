use pvpmeta::run_aggregations;

use crate::commands::shared::{connect, resolve_season};
use crate::config::Config;

/// Rebuild the popularity tables from the stored leaderboard data.
pub(crate) async fn handle_aggregate(
    season: Option<i64>,
    top_n: Option<usize>,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect(config, database_url).await?;
    let season = resolve_season(&db, season).await?;
    let top_n = top_n.unwrap_or(config.aggregation.top_n);

    tracing::info!(season = %season.display_name, top_n, "Aggregating popularity");
    let counts = run_aggregations(db.as_ref(), season.id, top_n).await?;

    println!(
        "{}: {} item, {} enchant and {} gem rows (top {} per bracket and spec)",
        season.display_name, counts.items, counts.enchants, counts.gems, top_n
    );
    Ok(())
}
