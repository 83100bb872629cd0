//! Talent tree a talent belongs to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TalentType {
    #[sea_orm(string_value = "class")]
    Class,
    #[sea_orm(string_value = "spec")]
    Spec,
    #[sea_orm(string_value = "hero")]
    Hero,
    #[sea_orm(string_value = "pvp")]
    Pvp,
}

impl std::fmt::Display for TalentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TalentType::Class => write!(f, "class"),
            TalentType::Spec => write!(f, "spec"),
            TalentType::Hero => write!(f, "hero"),
            TalentType::Pvp => write!(f, "pvp"),
        }
    }
}
