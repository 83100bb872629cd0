//! One full sync cycle: leaderboards, characters, item icons, aggregation.

use std::time::Instant;

use chrono::{DateTime, FixedOffset, Utc};

use crate::aggregation::run_aggregations;
use crate::entity::pvp_season;
use crate::entity::sync_cycle_status::SyncCycleStatus;
use crate::repository::character as character_repo;
use crate::repository::leaderboard as leaderboard_repo;
use crate::repository::sync_cycle;

use super::character::sync_character_batch;
use super::context::SyncContext;
use super::errors::{Result, SyncError};
use super::executor::run_bounded_shared;
use super::leaderboard::{discover_brackets, sync_leaderboard};
use super::logger;
use super::meta::{sync_character_meta, sync_item_meta};
use super::progress::SyncProgress;
use super::types::{CycleReport, RegionReport};

/// Run a sync cycle for the current season across every configured region.
///
/// The cycle row ends `completed`, or `failed` when an error escapes (the
/// error is then logged and returned).
///
/// # Errors
///
/// [`SyncError::NoCurrentSeason`] when no season is current, storage errors,
/// and [`SyncError::Interrupted`] after a shutdown request.
pub async fn run_cycle(ctx: &SyncContext) -> Result<CycleReport> {
    let started = Instant::now();
    let db = ctx.db();

    let season = leaderboard_repo::current_season(db)
        .await?
        .ok_or(SyncError::NoCurrentSeason)?;
    let snapshot_at = Utc::now().fixed_offset();
    let regions = ctx.options().regions.clone();

    let cycle = sync_cycle::create(db, season.id, &regions, snapshot_at).await?;
    logger::cycle_started(cycle.id, &season.display_name, &regions);
    ctx.emit(SyncProgress::CycleStarted {
        cycle_id: cycle.id,
        season: season.display_name.clone(),
        regions: regions.clone(),
    });

    match run_phases(ctx, &season, cycle.id, snapshot_at, started).await {
        Ok(report) => Ok(report),
        Err(e) => {
            if let Err(mark_err) = sync_cycle::fail(db, cycle.id).await {
                tracing::error!(cycle_id = cycle.id, error = %mark_err, "Could not mark cycle failed");
            }
            logger::error(&e.to_string());
            ctx.emit(SyncProgress::CycleFailed {
                cycle_id: cycle.id,
                error: e.to_string(),
            });
            Err(e)
        }
    }
}

async fn run_phases(
    ctx: &SyncContext,
    season: &pvp_season::Model,
    cycle_id: i64,
    snapshot_at: DateTime<FixedOffset>,
    started: Instant,
) -> Result<CycleReport> {
    let db = ctx.db();
    let options = ctx.options();

    let mut handles = Vec::with_capacity(options.regions.len());
    for region in &options.regions {
        let ctx = ctx.clone();
        let region = region.clone();
        let season = season.clone();
        handles.push(tokio::spawn(async move {
            run_region_lane(&ctx, &region, &season, cycle_id, snapshot_at).await
        }));
    }

    let mut regions = Vec::with_capacity(handles.len());
    let mut lane_error = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(report)) => regions.push(report),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Region lane failed");
                lane_error.get_or_insert(e);
            }
            Err(e) => {
                lane_error.get_or_insert(SyncError::Unexpected(format!("Region lane panicked: {}", e)));
            }
        }
    }
    if let Some(e) = lane_error {
        return Err(e);
    }
    check_shutdown(ctx)?;

    let mut report = CycleReport {
        cycle_id,
        season_id: season.id,
        regions,
        ..Default::default()
    };

    if options.sync_item_meta {
        let counts = sync_item_meta(ctx, None).await?;
        report.items_meta_synced = counts.synced;
        ctx.emit(SyncProgress::ItemMetaSynced {
            synced: counts.synced,
            missing: counts.missing,
        });
        check_shutdown(ctx)?;
    }

    if !options.skip_aggregation {
        sync_cycle::set_status(db, cycle_id, SyncCycleStatus::Aggregating).await?;
        ctx.emit(SyncProgress::Aggregating {
            season_id: season.id,
        });
        let counts = run_aggregations(db, season.id, options.top_n).await?;
        logger::aggregations_complete(counts.items, counts.enchants, counts.gems);
        ctx.emit(SyncProgress::AggregationComplete {
            items: counts.items,
            enchants: counts.enchants,
            gems: counts.gems,
        });
        report.aggregations = Some(counts);
    }

    sync_cycle::complete(db, cycle_id).await?;
    report.elapsed = started.elapsed();
    logger::cycle_complete(cycle_id, Some(report.elapsed));
    ctx.emit(SyncProgress::CycleComplete {
        cycle_id,
        elapsed: report.elapsed,
    });

    Ok(report)
}

fn check_shutdown(ctx: &SyncContext) -> Result<()> {
    if ctx.is_shutdown_requested() {
        ctx.emit(SyncProgress::ShutdownRequested);
        return Err(SyncError::Interrupted);
    }
    Ok(())
}

/// Leaderboards then characters for one region.
///
/// Failed leaderboards and failed batches are counted, not raised. A shutdown
/// request ends the lane early with what it has.
#[tracing::instrument(skip(ctx, season, snapshot_at), fields(season = season.blizzard_id))]
async fn run_region_lane(
    ctx: &SyncContext,
    region: &str,
    season: &pvp_season::Model,
    cycle_id: i64,
    snapshot_at: DateTime<FixedOffset>,
) -> Result<RegionReport> {
    let db = ctx.db();
    let options = ctx.options();
    let client = ctx.client(region)?;
    let locale = client.locale().to_string();
    let mut report = RegionReport {
        region: region.to_string(),
        ..Default::default()
    };

    let brackets = discover_brackets(client, season.blizzard_id).await;
    report.brackets = brackets.len();
    ctx.emit(SyncProgress::BracketsDiscovered {
        region: region.to_string(),
        count: brackets.len(),
    });

    let results = run_bounded_shared(
        brackets,
        options.leaderboard_concurrency,
        options.pool_limit,
        ctx.pool_permits(),
        |bracket| {
            let ctx = ctx.clone();
            let region = region.to_string();
            let season = season.clone();
            async move {
                match sync_leaderboard(&ctx, &region, &season, &bracket, snapshot_at).await {
                    Ok(result) => {
                        ctx.emit(SyncProgress::LeaderboardSynced {
                            region,
                            bracket,
                            entries: result.entries,
                        });
                        Some(Some(result))
                    }
                    Err(e) => {
                        tracing::warn!(region = %region, bracket = %bracket, error = %e, "Leaderboard sync failed");
                        ctx.emit(SyncProgress::LeaderboardFailed {
                            region,
                            bracket,
                            error: e.short_message(),
                        });
                        Some(None)
                    }
                }
            }
        },
    )
    .await;

    let mut character_ids: Vec<i64> = Vec::new();
    for result in results {
        match result {
            Some(result) => character_ids.extend(result.character_ids),
            None => report.leaderboards_failed += 1,
        }
    }
    character_ids.sort_unstable();
    character_ids.dedup();
    report.characters = character_ids.len();

    if ctx.is_shutdown_requested() {
        return Ok(report);
    }

    let now = Utc::now().fixed_offset();
    let recent = leaderboard_repo::recently_processed_character_ids(
        db,
        &character_ids,
        now - options.ttls.equipment,
    )
    .await?;
    report.recently_synced = recent.len();
    let to_sync = character_ids.len() - recent.len();
    logger::leaderboards_synced(region, character_ids.len(), to_sync, recent.len());
    ctx.emit(SyncProgress::CharactersSelected {
        region: region.to_string(),
        total: character_ids.len(),
        to_sync,
        recently_synced: recent.len(),
    });

    let stale = character_repo::find_meta_stale(db, &character_ids, now - options.ttls.meta).await?;
    if !stale.is_empty() {
        ctx.emit(SyncProgress::SyncingCharacterMeta {
            region: region.to_string(),
            count: stale.len(),
        });
        report.meta_synced = sync_character_meta(ctx, &stale).await?;
    }

    let batches: Vec<&[i64]> = character_ids.chunks(options.batch_size.max(1)).collect();
    report.batches = batches.len();
    if batches.is_empty() {
        return Ok(report);
    }
    sync_cycle::set_status(db, cycle_id, SyncCycleStatus::SyncingCharacters).await?;
    sync_cycle::add_expected_batches(db, cycle_id, i32::try_from(batches.len()).unwrap_or(i32::MAX))
        .await?;

    for (index, batch) in batches.iter().enumerate() {
        if ctx.is_shutdown_requested() {
            tracing::info!(region, completed = index, "Shutdown requested, stopping lane");
            break;
        }
        let number = index + 1;
        ctx.emit(SyncProgress::BatchStarted {
            region: region.to_string(),
            batch: number,
            batches: batches.len(),
            size: batch.len(),
        });

        let label = format!("{} batch {}/{}", region, number, batches.len());
        let (succeeded, failed) = match sync_character_batch(ctx, batch, &locale, &label).await {
            Ok(outcome) => {
                for (status, count) in outcome.counts_by_status() {
                    *report.statuses.entry(status.as_str().to_string()).or_default() += count;
                }
                (outcome.success_count(), outcome.failure_count())
            }
            Err(e) => {
                logger::error(&e.to_string());
                report.batches_failed += 1;
                (0, batch.len())
            }
        };
        report.succeeded += succeeded;
        report.failed += failed;
        ctx.emit(SyncProgress::BatchComplete {
            region: region.to_string(),
            batch: number,
            batches: batches.len(),
            succeeded,
            failed,
        });

        sync_cycle::increment_completed_batches(db, cycle_id).await?;
    }

    Ok(report)
}
