//! Static sync policy: which brackets to sync and how, and per-region lanes.
//!
//! Everything here is immutable process-wide data behind pure functions.

mod bracket;
mod region;

pub use bracket::{
    BracketFamily, BracketPolicy, classify, family_policy, is_syncable, policy_for,
};
pub use region::{RegionPolicy, SYNC_REGIONS, SyncTtls, region_policy_for};
