//! A character's currently equipped item in one slot.
//!
//! Rebuilt wholesale whenever the equipment fingerprint changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "character_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub character_id: i64,
    /// Uppercase slot type, e.g. `HEAD`.
    pub slot: String,
    /// Internal `items.id`.
    pub item_id: i64,
    pub item_level: i32,
    /// Upstream enchantment id of the permanent enchant.
    pub enchantment_id: Option<i64>,
    /// `[{"type": "PRISMATIC", "item_id": 213746}, ...]`
    #[sea_orm(column_type = "Json")]
    pub sockets: Json,
    #[sea_orm(column_type = "Json")]
    pub bonus_list: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::character::Entity",
        from = "Column::CharacterId",
        to = "super::character::Column::Id"
    )]
    Character,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Character.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// One socket of a [`Model`], as stored in `sockets`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socket {
    #[serde(rename = "type")]
    pub socket_type: String,
    /// Upstream item id of the gem, if one is socketed.
    pub item_id: Option<i64>,
}

impl Model {
    /// Decoded sockets. Malformed JSON yields an empty list.
    pub fn socket_list(&self) -> Vec<Socket> {
        serde_json::from_value(self.sockets.clone()).unwrap_or_default()
    }
}
