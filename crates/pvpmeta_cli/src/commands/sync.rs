//! One full sync cycle: leaderboards, characters, item icons, aggregation.

use std::sync::Arc;

use console::style;
use pvpmeta::sync::{CycleReport, SyncContext, SyncOptions, run_cycle};

use crate::commands::shared::{build_clients, connect};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::shutdown_flag;

/// Options for `pvpmeta sync`. Unset values come from the config file.
#[derive(Debug, Clone, clap::Args)]
pub struct SyncArgs {
    /// Regions to sync, comma separated (default from config or us,eu)
    #[arg(short, long, value_delimiter = ',')]
    regions: Vec<String>,

    /// Concurrent character syncs per batch (default from config or 10)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Characters per batch (default from config or 50)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Characters per (bracket, spec) counted by the aggregations
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Skip the aggregation phase
    #[arg(long)]
    skip_aggregation: bool,

    /// Don't fetch icons for newly seen items
    #[arg(long)]
    no_item_meta: bool,

    /// Disable proactive rate limiting (may cause API throttling)
    #[arg(short = 'R', long)]
    no_rate_limit: bool,
}

impl SyncArgs {
    /// Merge CLI args over config defaults.
    fn options(&self, config: &Config) -> SyncOptions {
        let regions = if self.regions.is_empty() {
            config.sync.regions.clone()
        } else {
            self.regions.iter().map(|r| r.trim().to_lowercase()).collect()
        };

        SyncOptions {
            regions,
            concurrency: self.concurrency.unwrap_or(config.sync.concurrency),
            leaderboard_concurrency: config.sync.leaderboard_concurrency,
            meta_concurrency: config.sync.meta_concurrency,
            batch_size: self.batch_size.unwrap_or(config.sync.batch_size).max(1),
            pool_limit: config.database.max_connections.max(1) as usize,
            top_n: self.top_n.unwrap_or(config.aggregation.top_n),
            skip_aggregation: self.skip_aggregation,
            sync_item_meta: !self.no_item_meta,
            ..SyncOptions::default()
        }
    }
}

pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.options(config);
    let no_rate_limit = args.no_rate_limit || config.sync.no_rate_limit;
    let clients = build_clients(&config.blizzard, &options.regions, no_rate_limit)?;
    let db = connect(config, database_url).await?;

    let reporter = Arc::new(ProgressReporter::new());
    if no_rate_limit && reporter.is_interactive() {
        eprintln!("Warning: Rate limiting disabled - you may experience API throttling\n");
    }

    let ctx = clients
        .into_iter()
        .fold(SyncContext::builder(), |builder, client| builder.client(client))
        .database(db)
        .options(options)
        .progress(reporter.as_callback())
        .shutdown_flag(shutdown_flag())
        .build()?;

    let result = run_cycle(&ctx).await;
    reporter.finish();

    let report = result?;
    if reporter.is_interactive() {
        print_report(&report);
    } else {
        tracing::info!(
            cycle_id = report.cycle_id,
            characters = report.characters(),
            failed = report.failed(),
            elapsed_secs = report.elapsed.as_secs(),
            "Sync finished"
        );
    }
    Ok(())
}

fn print_report(report: &CycleReport) {
    println!(
        "\n{} Sync cycle #{} finished in {}s",
        style("✓").green().bold(),
        report.cycle_id,
        report.elapsed.as_secs()
    );

    for region in &report.regions {
        let statuses = region
            .statuses
            .iter()
            .map(|(status, count)| format!("{}: {}", status, count))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {:<3} {} brackets, {} characters ({} recent), {} ok, {} failed",
            style(region.region.to_uppercase()).cyan(),
            region.brackets,
            region.characters,
            region.recently_synced,
            region.succeeded,
            region.failed,
        );
        if !statuses.is_empty() {
            println!("      {}", style(statuses).dim());
        }
        if region.leaderboards_failed > 0 || region.batches_failed > 0 {
            println!(
                "      {} {} leaderboard(s) and {} batch(es) failed",
                style("⚠").yellow().bold(),
                region.leaderboards_failed,
                region.batches_failed
            );
        }
    }

    if report.items_meta_synced > 0 {
        println!("  {} item icons synced", report.items_meta_synced);
    }
    match report.aggregations {
        Some(counts) => println!(
            "  Aggregated {} item, {} enchant and {} gem rows",
            counts.items, counts.enchants, counts.gems
        ),
        None => println!("  Aggregation skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SyncArgs,
    }

    fn parse(argv: &[&str]) -> SyncArgs {
        TestCli::parse_from(std::iter::once("pvpmeta").chain(argv.iter().copied())).args
    }

    #[test]
    fn config_supplies_unset_values() {
        let mut config = Config::default();
        config.sync.batch_size = 20;
        config.database.max_connections = 4;

        let options = parse(&[]).options(&config);

        assert_eq!(options.regions, vec!["us", "eu"]);
        assert_eq!(options.batch_size, 20);
        assert_eq!(options.pool_limit, 4);
        assert!(options.sync_item_meta);
        assert!(!options.skip_aggregation);
    }

    #[test]
    fn flags_override_config() {
        let options = parse(&[
            "--regions",
            "EU",
            "-c",
            "3",
            "-b",
            "10",
            "--skip-aggregation",
            "--no-item-meta",
        ])
        .options(&Config::default());

        assert_eq!(options.regions, vec!["eu"]);
        assert_eq!(options.concurrency, 3);
        assert_eq!(options.batch_size, 10);
        assert!(options.skip_aggregation);
        assert!(!options.sync_item_meta);
    }

    #[test]
    fn region_list_is_comma_separated() {
        let options = parse(&["-r", "us,eu"]).options(&Config::default());
        assert_eq!(options.regions, vec!["us", "eu"]);
    }
}
