//! Talent catalog entity. Unique per (blizzard_id, talent_type).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::talent_type::TalentType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "talents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub blizzard_id: i64,
    pub talent_type: TalentType,
    pub spell_id: Option<i64>,
    pub meta_synced_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
