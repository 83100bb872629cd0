use pvpmeta::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::CycleStarted {
                cycle_id,
                season,
                regions,
            } => {
                tracing::info!(cycle_id, season = %season, regions = ?regions, "Sync cycle started");
            }

            SyncProgress::BracketsDiscovered { region, count } => {
                tracing::info!(region = %region, count, "Brackets discovered");
            }

            SyncProgress::LeaderboardSynced {
                region,
                bracket,
                entries,
            } => {
                tracing::debug!(region = %region, bracket = %bracket, entries, "Leaderboard synced");
            }

            SyncProgress::LeaderboardFailed {
                region,
                bracket,
                error,
            } => {
                tracing::warn!(region = %region, bracket = %bracket, error = %error, "Leaderboard sync failed");
            }

            SyncProgress::CharactersSelected {
                region,
                total,
                to_sync,
                recently_synced,
            } => {
                tracing::info!(region = %region, total, to_sync, recently_synced, "Characters selected");
            }

            SyncProgress::SyncingCharacterMeta { region, count } => {
                tracing::info!(region = %region, count, "Refreshing character profiles");
            }

            SyncProgress::BatchStarted {
                region,
                batch,
                batches,
                size,
            } => {
                tracing::debug!(region = %region, batch, batches, size, "Batch started");
            }

            SyncProgress::BatchComplete {
                region,
                batch,
                batches,
                succeeded,
                failed,
            } => {
                if failed > 0 {
                    tracing::warn!(region = %region, batch, batches, succeeded, failed, "Batch complete with failures");
                } else {
                    tracing::info!(region = %region, batch, batches, succeeded, "Batch complete");
                }
            }

            SyncProgress::ItemMetaSynced { synced, missing } => {
                tracing::info!(synced, missing, "Item icons synced");
            }

            SyncProgress::Aggregating { season_id } => {
                tracing::info!(season_id, "Aggregating popularity");
            }

            SyncProgress::AggregationComplete {
                items,
                enchants,
                gems,
            } => {
                tracing::info!(items, enchants, gems, "Aggregation complete");
            }

            SyncProgress::CycleComplete { cycle_id, elapsed } => {
                tracing::info!(cycle_id, elapsed_secs = elapsed.as_secs(), "Sync cycle complete");
            }

            SyncProgress::CycleFailed { cycle_id, error } => {
                tracing::error!(cycle_id, error = %error, "Sync cycle failed");
            }

            SyncProgress::ShutdownRequested => {
                tracing::warn!("Shutdown requested, stopping at the next batch boundary");
            }

            SyncProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
