//! Sync options, constants and result types.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::aggregation::AggregationCounts;
use crate::policy::{SYNC_REGIONS, SyncTtls};

/// Default concurrent character syncs within a batch.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default concurrent leaderboard fetches per region.
pub const DEFAULT_LEADERBOARD_CONCURRENCY: usize = 10;

/// Default concurrent metadata fetches (characters and items).
pub const DEFAULT_META_CONCURRENCY: usize = 10;

/// Characters per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Connection pool size assumed when none is configured.
pub const DEFAULT_POOL_LIMIT: usize = 10;

/// Top characters per (bracket, spec) counted by the aggregations.
pub const DEFAULT_TOP_N: usize = 1000;

/// Options for one sync cycle.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Regions to sync, each in its own lane.
    pub regions: Vec<String>,
    /// Concurrent character syncs within a batch.
    pub concurrency: usize,
    pub leaderboard_concurrency: usize,
    pub meta_concurrency: usize,
    pub batch_size: usize,
    /// Database pool size; the executor keeps one connection free.
    pub pool_limit: usize,
    pub top_n: usize,
    pub ttls: SyncTtls,
    /// Skip the aggregation phase.
    pub skip_aggregation: bool,
    /// Fetch item icons for items first seen during the cycle.
    pub sync_item_meta: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            regions: SYNC_REGIONS.iter().map(|r| r.to_string()).collect(),
            concurrency: DEFAULT_CONCURRENCY,
            leaderboard_concurrency: DEFAULT_LEADERBOARD_CONCURRENCY,
            meta_concurrency: DEFAULT_META_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            pool_limit: DEFAULT_POOL_LIMIT,
            top_n: DEFAULT_TOP_N,
            ttls: SyncTtls::default(),
            skip_aggregation: false,
            sync_item_meta: true,
        }
    }
}

/// Result of one leaderboard sync.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardSyncResult {
    pub bracket: String,
    /// Entries inserted.
    pub entries: usize,
    /// Internal ids of every character on the synced part of the board.
    pub character_ids: Vec<i64>,
    /// Old snapshots deleted.
    pub pruned: u64,
}

/// What one region lane did.
#[derive(Debug, Clone, Default)]
pub struct RegionReport {
    pub region: String,
    pub brackets: usize,
    pub leaderboards_failed: usize,
    pub characters: usize,
    pub recently_synced: usize,
    pub batches: usize,
    pub batches_failed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Outcome status counts over all batches of the lane.
    pub statuses: BTreeMap<String, usize>,
    pub meta_synced: usize,
}

/// Result of [`run_cycle`](super::run_cycle).
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub cycle_id: i64,
    pub season_id: i64,
    pub regions: Vec<RegionReport>,
    pub items_meta_synced: usize,
    pub aggregations: Option<AggregationCounts>,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn characters(&self) -> usize {
        self.regions.iter().map(|r| r.characters).sum()
    }

    pub fn failed(&self) -> usize {
        self.regions.iter().map(|r| r.failed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_options_default() {
        let options = SyncOptions::default();
        assert_eq!(options.regions, vec!["us".to_string(), "eu".to_string()]);
        assert_eq!(options.batch_size, 50);
        assert_eq!(options.leaderboard_concurrency, 10);
        assert_eq!(options.top_n, 1000);
        assert!(!options.skip_aggregation);
    }

    #[test]
    fn report_totals_sum_regions() {
        let report = CycleReport {
            regions: vec![
                RegionReport {
                    characters: 3,
                    failed: 1,
                    ..Default::default()
                },
                RegionReport {
                    characters: 4,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(report.characters(), 7);
        assert_eq!(report.failed(), 1);
    }
}
