//! Character entity - a player character seen on at least one leaderboard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::faction::Faction;

/// Character model.
///
/// `realm` and `name` are stored lowercased, so the (region, realm, name)
/// triple is unique case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "characters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    // ─── Identity ────────────────────────────────────────────────────────────
    /// Upstream character id, unique per region.
    pub blizzard_id: i64,
    pub region: String,
    /// Realm slug.
    pub realm: String,
    pub name: String,
    pub faction: Option<Faction>,

    // ─── Profile ─────────────────────────────────────────────────────────────
    pub class_id: Option<i32>,
    pub class_slug: Option<String>,
    pub race: Option<String>,
    pub race_id: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub inset_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub main_raw_url: Option<String>,
    /// Profile is hidden upstream; the character is never fetched again.
    #[sea_orm(default_value = false)]
    pub is_private: bool,

    // ─── Sync State ──────────────────────────────────────────────────────────
    /// Fingerprint of the gear `character_items` was built from.
    #[sea_orm(column_type = "Text", nullable)]
    pub equipment_fingerprint: Option<String>,
    /// `Last-Modified` of the last equipment response.
    pub equipment_last_modified: Option<String>,
    /// `Last-Modified` of the last specializations response.
    pub talents_last_modified: Option<String>,
    pub last_equipment_snapshot_at: Option<DateTimeWithTimeZone>,
    pub meta_synced_at: Option<DateTimeWithTimeZone>,
    /// Skip the character until this time (set after a 404).
    pub unavailable_until: Option<DateTimeWithTimeZone>,

    // ─── Timestamps ──────────────────────────────────────────────────────────
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pvp_leaderboard_entry::Entity")]
    LeaderboardEntries,
    #[sea_orm(has_many = "super::character_item::Entity")]
    CharacterItems,
}

impl Related<super::pvp_leaderboard_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaderboardEntries.def()
    }
}

impl Related<super::character_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CharacterItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the character may be fetched at `now`.
    pub fn is_available(&self, now: DateTimeWithTimeZone) -> bool {
        !self.is_private && self.unavailable_until.is_none_or(|until| until <= now)
    }

    /// Whether either conditional-request validator is stored.
    pub fn has_validators(&self) -> bool {
        self.equipment_last_modified.is_some() || self.talents_last_modified.is_some()
    }

    /// `name-realm`, for log lines.
    pub fn display_name(&self) -> String {
        format!("{}-{}", self.name, self.realm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    pub(crate) fn make_test_model() -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: 1,
            blizzard_id: 1001,
            region: "us".to_string(),
            realm: "area-52".to_string(),
            name: "zed".to_string(),
            faction: Some(Faction::Horde),
            class_id: None,
            class_slug: None,
            race: None,
            race_id: None,
            avatar_url: None,
            inset_url: None,
            main_raw_url: None,
            is_private: false,
            equipment_fingerprint: None,
            equipment_last_modified: None,
            talents_last_modified: None,
            last_equipment_snapshot_at: None,
            meta_synced_at: None,
            unavailable_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn availability_respects_private_and_cooldown() {
        let now = Utc::now().fixed_offset();
        let mut model = make_test_model();
        assert!(model.is_available(now));

        model.unavailable_until = Some(now + Duration::days(1));
        assert!(!model.is_available(now));

        model.unavailable_until = Some(now - Duration::days(1));
        assert!(model.is_available(now));

        model.is_private = true;
        assert!(!model.is_available(now));
    }

    #[test]
    fn validators_and_display_name() {
        let mut model = make_test_model();
        assert!(!model.has_validators());
        model.talents_last_modified = Some("Wed, 04 Feb 2026 03:31:52 GMT".into());
        assert!(model.has_validators());
        assert_eq!(model.display_name(), "zed-area-52");
    }
}
