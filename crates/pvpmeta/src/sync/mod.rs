//! Leaderboard and character sync.
//!
//! # Module Structure
//!
//! - [`types`] - Options, defaults and report types
//! - [`progress`] - Progress events: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`context`] - Shared state: database, per-region clients, options
//! - [`executor`] - Pool-aware bounded concurrency
//! - [`outcome`] - Per-batch success/failure accounting
//! - [`extract`] - Equipment and talent payload reduction
//! - [`leaderboard`] - Bracket discovery and leaderboard snapshots
//! - [`character`] - Per-character enrichment
//! - [`meta`] - Character profile/media and item icons
//! - [`cycle`] - The orchestrator: `run_cycle()`
//! - [`logger`] - Human-readable cycle log lines
//!
//! # Example
//!
//! ```ignore
//! use pvpmeta::sync::{SyncContext, SyncOptions, run_cycle};
//!
//! let ctx = SyncContext::builder()
//!     .database(Arc::new(db))
//!     .client(us_client)
//!     .client(eu_client)
//!     .options(SyncOptions::default())
//!     .build()?;
//! let report = run_cycle(&ctx).await?;
//! println!("{} characters, {} failed", report.characters(), report.failed());
//! ```

pub mod character;
pub mod context;
pub mod cycle;
mod errors;
pub mod executor;
pub mod extract;
pub mod leaderboard;
pub mod logger;
pub mod meta;
pub mod outcome;
mod progress;
mod types;

pub use errors::{Result, SyncError};

pub use types::{CycleReport, LeaderboardSyncResult, RegionReport, SyncOptions};

pub use types::{
    DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_LEADERBOARD_CONCURRENCY,
    DEFAULT_META_CONCURRENCY, DEFAULT_POOL_LIMIT, DEFAULT_TOP_N,
};

pub use progress::{ProgressCallback, SyncProgress, emit};

pub use character::{sync_character, sync_character_batch};
pub use context::{SyncContext, SyncContextBuilder, SyncContextError};
pub use cycle::run_cycle;
pub use executor::{effective_concurrency, run_bounded, run_bounded_shared, shared_permits};
pub use leaderboard::{discover_brackets, sync_leaderboard};
pub use meta::{ItemMetaCounts, sync_character_meta, sync_item_meta};
pub use outcome::{BatchOutcome, OutcomeStatus};
