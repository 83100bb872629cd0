use pvpmeta::sync::{SyncContext, SyncOptions, sync_item_meta};

use crate::commands::shared::{build_clients, connect};
use crate::config::Config;

/// Fetch icons for every item still missing them.
pub(crate) async fn handle_items(
    region: Option<String>,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let region = match region {
        Some(region) => region.to_lowercase(),
        None => config
            .sync
            .regions
            .first()
            .cloned()
            .ok_or("No sync regions configured")?,
    };
    let regions = vec![region];

    let clients = build_clients(&config.blizzard, &regions, config.sync.no_rate_limit)?;
    let db = connect(config, database_url).await?;

    let options = SyncOptions {
        regions,
        meta_concurrency: config.sync.meta_concurrency,
        pool_limit: config.database.max_connections.max(1) as usize,
        ..SyncOptions::default()
    };
    let ctx = clients
        .into_iter()
        .fold(SyncContext::builder(), |builder, client| builder.client(client))
        .database(db)
        .options(options)
        .build()?;

    let counts = sync_item_meta(&ctx, None).await?;
    println!(
        "Item icons: {} synced, {} without icon, {} failed",
        counts.synced, counts.missing, counts.failed
    );
    Ok(())
}
