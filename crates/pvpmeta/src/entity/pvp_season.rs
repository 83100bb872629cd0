//! PvP season entity. At most one row has `is_current = true`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pvp_seasons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Upstream season number, used in leaderboard paths.
    #[sea_orm(unique)]
    pub blizzard_id: i64,
    pub display_name: String,
    #[sea_orm(default_value = false)]
    pub is_current: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pvp_leaderboard::Entity")]
    Leaderboards,
}

impl Related<super::pvp_leaderboard::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leaderboards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
