//! Gem usage among top players, split by socket type.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pvp_meta_gem_popularity")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pvp_season_id: i64,
    pub bracket: String,
    pub spec_id: i32,
    pub slot: String,
    pub socket_type: String,
    /// Upstream item id of the gem.
    pub item_id: i64,
    pub usage_count: i32,
    #[sea_orm(column_type = "Double")]
    pub usage_pct: f64,
    pub snapshot_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
