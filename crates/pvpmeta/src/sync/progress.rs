//! Progress reporting types for sync operations.
//!
//! The library never prints. Callers pass a [`ProgressCallback`] and render
//! events however they like (log lines, spinners).

use std::time::Duration;

/// Progress events emitted during a sync cycle.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Cycle row created.
    CycleStarted {
        cycle_id: i64,
        season: String,
        regions: Vec<String>,
    },

    /// Leaderboards index read for a region.
    BracketsDiscovered {
        region: String,
        /// Syncable brackets found.
        count: usize,
    },

    /// One leaderboard stored.
    LeaderboardSynced {
        region: String,
        bracket: String,
        entries: usize,
    },

    /// One leaderboard could not be synced; the lane continues.
    LeaderboardFailed {
        region: String,
        bracket: String,
        error: String,
    },

    /// Character selection for a region finished.
    CharactersSelected {
        region: String,
        total: usize,
        to_sync: usize,
        recently_synced: usize,
    },

    /// Profile/media refresh for stale characters.
    SyncingCharacterMeta { region: String, count: usize },

    /// A character batch is about to run.
    BatchStarted {
        region: String,
        /// 1-indexed.
        batch: usize,
        batches: usize,
        size: usize,
    },

    /// A character batch finished.
    BatchComplete {
        region: String,
        batch: usize,
        batches: usize,
        succeeded: usize,
        failed: usize,
    },

    /// Item icons fetched.
    ItemMetaSynced { synced: usize, missing: usize },

    /// Aggregation phase started.
    Aggregating { season_id: i64 },

    /// Aggregation phase finished.
    AggregationComplete {
        items: u64,
        enchants: u64,
        gems: u64,
    },

    /// Cycle finished successfully.
    CycleComplete { cycle_id: i64, elapsed: Duration },

    /// Cycle aborted.
    CycleFailed { cycle_id: i64, error: String },

    /// Shutdown requested; the cycle stops at the next phase boundary.
    ShutdownRequested,

    /// Warning message (non-fatal).
    Warning { message: String },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
