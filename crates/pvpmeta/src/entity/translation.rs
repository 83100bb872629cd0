//! Localized strings owned by items, enchantments and talents.
//!
//! Keyed by (translatable_type, translatable_id, key, locale), e.g.
//! `("Item", 42, "name", "en_US")`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `translatable_type` values.
pub mod owner {
    pub const ITEM: &str = "Item";
    pub const ENCHANTMENT: &str = "Enchantment";
    pub const TALENT: &str = "Talent";
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "translations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub translatable_type: String,
    pub translatable_id: i64,
    pub key: String,
    pub locale: String,
    #[sea_orm(column_type = "Text")]
    pub value: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
