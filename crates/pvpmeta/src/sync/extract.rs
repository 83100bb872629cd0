//! Reduce upstream equipment and specialization payloads to what is stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blizzard::types::{
    EquipmentSummary, EquippedItem, SelectedTalent, SpecializationsSummary,
};
use crate::entity::talent_type::TalentType;

/// Slots never counted: cosmetic only.
pub const EXCLUDED_SLOTS: &[&str] = &["TABARD", "SHIRT"];

// ─── Talents ─────────────────────────────────────────────────────────────────

/// One selected talent of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentPick {
    pub id: i64,
    pub name: Option<String>,
    pub rank: Option<i32>,
}

/// The active loadout of a character's active specialization.
///
/// Default (all empty) when the payload has no active spec or loadout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TalentLoadout {
    pub spec_id: Option<i32>,
    /// Lowercased class talent tree name, e.g. `death knight`.
    pub class_slug: Option<String>,
    pub hero_tree_id: Option<i64>,
    pub hero_tree_name: Option<String>,
    pub class_talents: Vec<TalentPick>,
    pub spec_talents: Vec<TalentPick>,
    pub hero_talents: Vec<TalentPick>,
    /// The spec's `pvp_talent_slots`, verbatim.
    pub pvp_talents: Value,
    pub talent_loadout_code: String,
}

impl TalentLoadout {
    pub fn is_empty(&self) -> bool {
        self.class_talents.is_empty()
            && self.spec_talents.is_empty()
            && self.hero_talents.is_empty()
            && self.pvp_talents.is_null()
    }

    /// Every talent with its tree, PvP talents included.
    pub fn talent_records(&self) -> Vec<ExtractedTalent> {
        let trees = [
            (TalentType::Class, &self.class_talents),
            (TalentType::Spec, &self.spec_talents),
            (TalentType::Hero, &self.hero_talents),
        ];

        let mut out: Vec<ExtractedTalent> = trees
            .into_iter()
            .flat_map(|(talent_type, picks)| {
                picks.iter().map(move |p| ExtractedTalent {
                    blizzard_id: p.id,
                    talent_type,
                    name: p.name.clone(),
                    spell_id: None,
                })
            })
            .collect();
        out.extend(pvp_talent_records(&self.pvp_talents));
        out
    }
}

/// A talent ready to be upserted into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTalent {
    pub blizzard_id: i64,
    pub talent_type: TalentType,
    pub name: Option<String>,
    pub spell_id: Option<i64>,
}

pub fn extract_talents(payload: &SpecializationsSummary) -> TalentLoadout {
    let Some(active) = payload.active_specialization.as_ref() else {
        return TalentLoadout::default();
    };
    let Some(spec) = payload
        .specializations
        .iter()
        .find(|s| s.specialization.name.is_some() && s.specialization.name == active.name)
    else {
        return TalentLoadout::default();
    };
    let Some(loadout) = spec.loadouts.iter().find(|l| l.is_active) else {
        return TalentLoadout::default();
    };

    let hero = payload.active_hero_talent_tree.as_ref();

    TalentLoadout {
        spec_id: active.id.and_then(|id| i32::try_from(id).ok()),
        class_slug: loadout
            .selected_class_talent_tree
            .as_ref()
            .and_then(|t| t.name.as_deref())
            .map(str::to_lowercase),
        hero_tree_id: hero.and_then(|h| h.id),
        hero_tree_name: hero.and_then(|h| h.name.clone()),
        class_talents: talent_tree(&loadout.selected_class_talents),
        spec_talents: talent_tree(&loadout.selected_spec_talents),
        hero_talents: talent_tree(&loadout.selected_hero_talents),
        pvp_talents: spec.pvp_talent_slots.clone(),
        talent_loadout_code: loadout.talent_loadout_code.clone().unwrap_or_default(),
    }
}

fn talent_tree(selected: &[SelectedTalent]) -> Vec<TalentPick> {
    selected
        .iter()
        .filter_map(|t| {
            let info = t.tooltip.as_ref()?.talent.as_ref()?;
            Some(TalentPick {
                id: info.id?,
                name: info.name.clone(),
                rank: t.rank,
            })
        })
        .collect()
}

/// PvP talents from `pvp_talent_slots`:
/// `[{ "selected": { "talent": {id, name}, "spell_tooltip": { "spell": {id} } } }]`.
fn pvp_talent_records(slots: &Value) -> Vec<ExtractedTalent> {
    let Some(slots) = slots.as_array() else {
        return Vec::new();
    };

    slots
        .iter()
        .filter_map(|slot| {
            let selected = slot.get("selected").unwrap_or(slot);
            let info = selected.get("talent").unwrap_or(selected);
            Some(ExtractedTalent {
                blizzard_id: info.get("id")?.as_i64()?,
                talent_type: TalentType::Pvp,
                name: info.get("name").and_then(Value::as_str).map(str::to_string),
                spell_id: selected
                    .pointer("/spell_tooltip/spell/id")
                    .and_then(Value::as_i64),
            })
        })
        .collect()
}

// ─── Equipment ───────────────────────────────────────────────────────────────

/// One counted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    /// Uppercase slot type, e.g. `HEAD`.
    pub slot: String,
    /// Upstream item id.
    pub item_id: i64,
    pub item_level: i32,
    pub name: Option<String>,
    /// Lowercased.
    pub quality: Option<String>,
    /// Lowercased.
    pub inventory_type: Option<String>,
    /// Lowercased.
    pub item_class: Option<String>,
    /// Lowercased.
    pub item_subclass: Option<String>,
    pub media_id: Option<i64>,
    /// Permanent enchantment.
    pub enchantment_id: Option<i64>,
    pub enchantment_name: Option<String>,
    pub sockets: Vec<ExtractedSocket>,
    pub bonus_list: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSocket {
    #[serde(rename = "type")]
    pub socket_type: String,
    pub item_id: Option<i64>,
}

/// Item set summary of the first equipped set piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSet {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub pieces: i32,
    pub four_piece_active: bool,
}

/// Counted gear of one equipment payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentSnapshot {
    pub items: Vec<ExtractedItem>,
    /// Integer average over counted items.
    pub item_level: Option<i32>,
    pub tier_set: Option<TierSet>,
    pub fingerprint: String,
}

pub fn extract_equipment(payload: &EquipmentSummary) -> EquipmentSnapshot {
    let counted: Vec<&EquippedItem> = payload
        .equipped_items
        .iter()
        .filter(|i| is_counted(i))
        .collect();

    let items: Vec<ExtractedItem> = counted.iter().filter_map(|i| extract_item(i)).collect();

    let item_level = if counted.is_empty() {
        None
    } else {
        let sum: i64 = counted.iter().map(|i| i64::from(i.level.value)).sum();
        i32::try_from(sum / counted.len() as i64).ok()
    };

    let tier_set = counted.iter().find_map(|i| i.set.as_ref()).map(|set| TierSet {
        id: set.item_set.id,
        name: set.item_set.name.clone(),
        pieces: set.items.iter().filter(|m| m.is_equipped).count() as i32,
        four_piece_active: set
            .effects
            .iter()
            .any(|e| e.required_count == 4 && e.is_active),
    });

    EquipmentSnapshot {
        fingerprint: fingerprint(&counted),
        items,
        item_level,
        tier_set,
    }
}

fn is_counted(item: &EquippedItem) -> bool {
    let excluded = item
        .slot
        .kind
        .as_deref()
        .is_some_and(|slot| EXCLUDED_SLOTS.contains(&slot));
    !excluded && item.level.value > 0
}

fn permanent_enchant(item: &EquippedItem) -> Option<&crate::blizzard::types::ItemEnchantment> {
    item.enchantments
        .iter()
        .find(|e| e.enchantment_slot.kind.as_deref() == Some("PERMANENT"))
}

fn extract_item(item: &EquippedItem) -> Option<ExtractedItem> {
    let item_id = item.item.id?;
    let slot = item.slot.kind.clone()?;
    let enchant = permanent_enchant(item);

    Some(ExtractedItem {
        slot: slot.to_uppercase(),
        item_id,
        item_level: item.level.value,
        name: item.name.clone(),
        quality: item.quality.kind.as_deref().map(str::to_lowercase),
        inventory_type: item.inventory_type.kind.as_deref().map(str::to_lowercase),
        item_class: item.item_class.name.as_deref().map(str::to_lowercase),
        item_subclass: item.item_subclass.name.as_deref().map(str::to_lowercase),
        media_id: item.media.id,
        enchantment_id: enchant.and_then(|e| e.enchantment_id),
        enchantment_name: enchant.and_then(|e| e.display_string.clone()),
        sockets: item
            .sockets
            .iter()
            .map(|s| ExtractedSocket {
                socket_type: s.socket_type.kind.clone().unwrap_or_default(),
                item_id: s.item.as_ref().and_then(|g| g.id),
            })
            .collect(),
        bonus_list: item.bonus_list.clone(),
    })
}

/// `slot:item:ilvl:enchant` per counted item, sorted, comma-joined.
fn fingerprint(items: &[&EquippedItem]) -> String {
    let mut parts: Vec<String> = items
        .iter()
        .map(|i| {
            format!(
                "{}:{}:{}:{}",
                i.slot.kind.as_deref().unwrap_or_default().to_lowercase(),
                i.item.id.map(|id| id.to_string()).unwrap_or_default(),
                i.level.value,
                permanent_enchant(i)
                    .and_then(|e| e.enchantment_id)
                    .map(|id| id.to_string())
                    .unwrap_or_default()
            )
        })
        .collect();
    parts.sort();
    parts.join(",")
}
