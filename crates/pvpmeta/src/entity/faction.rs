//! Character faction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Faction {
    #[sea_orm(string_value = "alliance")]
    Alliance,
    #[sea_orm(string_value = "horde")]
    Horde,
}

impl Faction {
    /// Map the upstream `faction.type` value (`ALLIANCE` / `HORDE`).
    pub fn from_api(kind: &str) -> Option<Self> {
        match kind {
            "ALLIANCE" => Some(Faction::Alliance),
            "HORDE" => Some(Faction::Horde),
            _ => None,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Alliance => write!(f, "alliance"),
            Faction::Horde => write!(f, "horde"),
        }
    }
}
