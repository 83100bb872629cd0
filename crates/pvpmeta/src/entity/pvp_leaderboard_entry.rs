//! Leaderboard entry - an append-only snapshot of one character's standing.
//!
//! Rows are inserted by leaderboard sync and enriched in place by character
//! sync. The current snapshot of a character on a leaderboard is the row with
//! the greatest `snapshot_at`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pvp_leaderboard_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pvp_leaderboard_id: i64,
    pub character_id: i64,

    // ─── Standing ────────────────────────────────────────────────────────────
    pub rank: i32,
    pub rating: i32,
    pub wins: i32,
    pub losses: i32,
    pub snapshot_at: DateTimeWithTimeZone,

    // ─── Equipment Enrichment ────────────────────────────────────────────────
    pub item_level: Option<i32>,
    pub tier_set_id: Option<i64>,
    pub tier_set_name: Option<String>,
    pub tier_set_pieces: Option<i32>,
    pub tier_4p_active: Option<bool>,
    #[sea_orm(column_type = "Json", nullable)]
    pub raw_equipment: Option<Json>,
    pub equipment_processed_at: Option<DateTimeWithTimeZone>,

    // ─── Specialization Enrichment ───────────────────────────────────────────
    pub spec_id: Option<i32>,
    pub hero_talent_tree_id: Option<i64>,
    pub hero_talent_tree_name: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub raw_specialization: Option<Json>,
    pub specialization_processed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pvp_leaderboard::Entity",
        from = "Column::PvpLeaderboardId",
        to = "super::pvp_leaderboard::Column::Id"
    )]
    Leaderboard,
    #[sea_orm(
        belongs_to = "super::character::Entity",
        from = "Column::CharacterId",
        to = "super::character::Column::Id"
    )]
    Character,
}

impl Related<super::pvp_leaderboard::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leaderboard.def()
    }
}

impl Related<super::character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Character.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
