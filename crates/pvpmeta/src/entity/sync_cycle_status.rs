//! Lifecycle of a sync cycle.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SyncCycleStatus {
    #[sea_orm(string_value = "syncing_leaderboards")]
    #[default]
    SyncingLeaderboards,
    #[sea_orm(string_value = "syncing_characters")]
    SyncingCharacters,
    #[sea_orm(string_value = "aggregating")]
    Aggregating,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl SyncCycleStatus {
    /// Terminal states are never left.
    pub fn is_terminal(self) -> bool {
        matches!(self, SyncCycleStatus::Completed | SyncCycleStatus::Failed)
    }
}

impl std::fmt::Display for SyncCycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncCycleStatus::SyncingLeaderboards => "syncing_leaderboards",
            SyncCycleStatus::SyncingCharacters => "syncing_characters",
            SyncCycleStatus::Aggregating => "aggregating",
            SyncCycleStatus::Completed => "completed",
            SyncCycleStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}
