//! Item catalog entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub blizzard_id: i64,

    // ─── Classification ──────────────────────────────────────────────────────
    /// Lowercased inventory type, e.g. `head`.
    pub inventory_type: Option<String>,
    pub item_class: Option<String>,
    pub item_subclass: Option<String>,
    pub quality: Option<String>,

    // ─── Media ───────────────────────────────────────────────────────────────
    pub blizzard_media_id: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub icon_url: Option<String>,
    pub meta_synced_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::character_item::Entity")]
    CharacterItems,
}

impl Related<super::character_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CharacterItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
