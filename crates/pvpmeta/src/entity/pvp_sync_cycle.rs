//! One end-to-end sync run.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::sync_cycle_status::SyncCycleStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pvp_sync_cycles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pvp_season_id: i64,
    pub status: SyncCycleStatus,
    /// Regions synced in this cycle, as a JSON array.
    #[sea_orm(column_type = "Json")]
    pub regions: Json,
    /// Timestamp stamped on every leaderboard entry inserted by the cycle.
    pub snapshot_at: DateTimeWithTimeZone,
    #[sea_orm(default_value = 0)]
    pub expected_character_batches: i32,
    #[sea_orm(default_value = 0)]
    pub completed_character_batches: i32,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pvp_season::Entity",
        from = "Column::PvpSeasonId",
        to = "super::pvp_season::Column::Id"
    )]
    Season,
}

impl Related<super::pvp_season::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
