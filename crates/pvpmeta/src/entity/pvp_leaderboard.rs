//! One bracket leaderboard of a season in a region.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pvp_leaderboards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pvp_season_id: i64,
    pub bracket: String,
    pub region: String,
    pub last_synced_at: Option<DateTimeWithTimeZone>,
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
    #[sea_orm(has_many = "super::pvp_leaderboard_entry::Entity")]
    Entries,
}

impl Related<super::pvp_season::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl Related<super::pvp_leaderboard_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
