//! Upstream payload shapes.
//!
//! Only the fields the pipeline reads are modelled. Everything is
//! `#[serde(default)]` because upstream omits keys freely.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `{ "id": .., "name": .. }` reference used all over the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NamedRef {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// `{ "type": "HEAD", "name": "Head" }` enumeration wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TypedRef {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
}

/// A parsed document kept together with the JSON it came from.
#[derive(Debug, Clone)]
pub struct WithRaw<T> {
    pub parsed: T,
    pub raw: Value,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for WithRaw<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let parsed = T::deserialize(&raw).map_err(serde::de::Error::custom)?;
        Ok(Self { parsed, raw })
    }
}

// ─── Leaderboards ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeaderboardsIndex {
    pub leaderboards: Vec<LeaderboardRef>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeaderboardRef {
    /// Bracket name, e.g. `3v3` or `shuffle-mage-frost`.
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeaderboardEntry {
    pub character: LeaderboardCharacter,
    pub faction: TypedRef,
    pub rank: i32,
    pub rating: i32,
    pub season_match_statistics: MatchStatistics,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeaderboardCharacter {
    pub id: i64,
    pub name: String,
    pub realm: RealmRef,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RealmRef {
    pub id: Option<i64>,
    pub slug: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchStatistics {
    pub played: i32,
    pub won: i32,
    pub lost: i32,
}

// ─── Character profile and media ────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CharacterProfile {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub race: NamedRef,
    pub character_class: NamedRef,
    pub faction: TypedRef,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaAsset {
    pub key: String,
    pub value: String,
}

/// Media documents for characters and items share the `assets` list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaDocument {
    pub assets: Vec<MediaAsset>,
}

impl MediaDocument {
    /// URL of the asset with the given key.
    pub fn asset(&self, key: &str) -> Option<&str> {
        self.assets
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

// ─── Equipment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EquipmentSummary {
    pub equipped_items: Vec<EquippedItem>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EquippedItem {
    pub item: NamedRef,
    pub slot: TypedRef,
    pub name: Option<String>,
    pub quality: TypedRef,
    pub inventory_type: TypedRef,
    pub item_class: NamedRef,
    pub item_subclass: NamedRef,
    pub media: NamedRef,
    pub level: ItemLevel,
    pub bonus_list: Vec<i64>,
    pub enchantments: Vec<ItemEnchantment>,
    pub sockets: Vec<ItemSocket>,
    pub set: Option<ItemSetBlock>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemLevel {
    pub value: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemEnchantment {
    pub enchantment_id: Option<i64>,
    pub display_string: Option<String>,
    pub source_item: Option<NamedRef>,
    pub enchantment_slot: EnchantmentSlot,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EnchantmentSlot {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemSocket {
    pub socket_type: TypedRef,
    pub item: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemSetBlock {
    pub item_set: NamedRef,
    pub items: Vec<ItemSetMember>,
    pub effects: Vec<ItemSetEffect>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemSetMember {
    pub is_equipped: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemSetEffect {
    pub required_count: i32,
    pub is_active: bool,
}

// ─── Specializations ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpecializationsSummary {
    pub specializations: Vec<SpecializationEntry>,
    pub active_specialization: Option<NamedRef>,
    pub active_hero_talent_tree: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpecializationEntry {
    pub specialization: NamedRef,
    /// Kept verbatim; its shape varies between patches.
    pub pvp_talent_slots: Value,
    pub loadouts: Vec<Loadout>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Loadout {
    pub is_active: bool,
    pub talent_loadout_code: Option<String>,
    pub selected_class_talent_tree: Option<NamedRef>,
    pub selected_class_talents: Vec<SelectedTalent>,
    pub selected_spec_talents: Vec<SelectedTalent>,
    pub selected_hero_talents: Vec<SelectedTalent>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectedTalent {
    pub id: Option<i64>,
    pub rank: Option<i32>,
    pub tooltip: Option<TalentTooltip>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TalentTooltip {
    pub talent: Option<NamedRef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaderboard_entry_tolerates_missing_fields() {
        let lb: Leaderboard = serde_json::from_value(json!({
            "entries": [{
                "character": {"id": 7, "name": "Zed", "realm": {"slug": "area-52"}},
                "rank": 1,
                "rating": 2950
            }]
        }))
        .unwrap();

        let entry = &lb.entries[0];
        assert_eq!(entry.character.realm.slug, "area-52");
        assert_eq!(entry.season_match_statistics.won, 0);
        assert!(entry.faction.kind.is_none());
    }

    #[test]
    fn media_document_finds_asset_by_key() {
        let doc: MediaDocument = serde_json::from_value(json!({
            "assets": [
                {"key": "avatar", "value": "https://render/avatar.jpg"},
                {"key": "main-raw", "value": "https://render/main-raw.png"}
            ]
        }))
        .unwrap();

        assert_eq!(doc.asset("main-raw"), Some("https://render/main-raw.png"));
        assert_eq!(doc.asset("inset"), None);
    }

    #[test]
    fn with_raw_keeps_unmodelled_fields() {
        let doc: WithRaw<EquipmentSummary> = serde_json::from_value(json!({
            "equipped_items": [{"item": {"id": 212065}, "slot": {"type": "HEAD"}}],
            "character": {"id": 7},
            "_links": {"self": {"href": "https://example/equipment"}}
        }))
        .unwrap();

        assert_eq!(doc.parsed.equipped_items.len(), 1);
        assert_eq!(doc.raw["character"]["id"], 7);
        assert_eq!(doc.raw["_links"]["self"]["href"], "https://example/equipment");
    }

    #[test]
    fn with_raw_reports_shape_errors() {
        let result = serde_json::from_value::<WithRaw<Leaderboard>>(json!({"entries": "nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn type_fields_are_renamed() {
        let slot: TypedRef = serde_json::from_value(json!({"type": "HEAD", "name": "Head"})).unwrap();
        assert_eq!(slot.kind.as_deref(), Some("HEAD"));
        let back = serde_json::to_value(&slot).unwrap();
        assert_eq!(back["type"], "HEAD");
    }
}
