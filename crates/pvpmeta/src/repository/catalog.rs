//! Items, enchantments, talents, their translations, and character gear.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::OnConflict,
};
use serde_json::Value as Json;

use crate::entity::character_item::{self, Entity as CharacterItem};
use crate::entity::enchantment::{self, Entity as Enchantment};
use crate::entity::item::{self, Entity as Item};
use crate::entity::talent::{self, Entity as Talent};
use crate::entity::talent_type::TalentType;
use crate::entity::translation::{self, Entity as Translation};

use super::errors::{RepositoryError, Result, with_write_retry};

const UPSERT_CHUNK: usize = 500;

/// Catalog attributes of an item as seen in an equipment payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRecord {
    pub blizzard_id: i64,
    pub inventory_type: Option<String>,
    pub item_class: Option<String>,
    pub item_subclass: Option<String>,
    pub quality: Option<String>,
    pub blizzard_media_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalentRecord {
    pub blizzard_id: i64,
    pub talent_type: TalentType,
    pub spell_id: Option<i64>,
}

/// One localized string to upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub translatable_id: i64,
    pub key: String,
    pub locale: String,
    pub value: String,
}

/// A row of `character_items` before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterItemRecord {
    pub slot: String,
    /// Internal `items.id`.
    pub item_id: i64,
    pub item_level: i32,
    pub enchantment_id: Option<i64>,
    pub sockets: Json,
    pub bonus_list: Json,
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// Insert or refresh items by `blizzard_id`. Returns `blizzard_id -> id`.
///
/// `icon_url` and `meta_synced_at` are owned by the metadata sync and never
/// touched here.
pub async fn upsert_items<C: ConnectionTrait>(
    db: &C,
    records: &[ItemRecord],
) -> Result<HashMap<i64, i64>> {
    let mut unique: HashMap<i64, &ItemRecord> = HashMap::new();
    for record in records {
        unique.insert(record.blizzard_id, record);
    }
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let now = Utc::now().fixed_offset();
    let mut rows: Vec<&ItemRecord> = unique.into_values().collect();
    rows.sort_by_key(|r| r.blizzard_id);

    for chunk in rows.chunks(UPSERT_CHUNK) {
        let models: Vec<item::ActiveModel> = chunk
            .iter()
            .map(|r| item::ActiveModel {
                blizzard_id: Set(r.blizzard_id),
                inventory_type: Set(r.inventory_type.clone()),
                item_class: Set(r.item_class.clone()),
                item_subclass: Set(r.item_subclass.clone()),
                quality: Set(r.quality.clone()),
                blizzard_media_id: Set(r.blizzard_media_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        with_write_retry("item upsert", || {
            let models = models.clone();
            async move {
                Item::insert_many(models)
                    .on_conflict(
                        OnConflict::column(item::Column::BlizzardId)
                            .update_columns([
                                item::Column::InventoryType,
                                item::Column::ItemClass,
                                item::Column::ItemSubclass,
                                item::Column::Quality,
                                item::Column::BlizzardMediaId,
                                item::Column::UpdatedAt,
                            ])
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
                    .map_err(RepositoryError::from)
            }
        })
        .await?;
    }

    let blizzard_ids: Vec<i64> = rows.iter().map(|r| r.blizzard_id).collect();
    item_ids_by_blizzard_id(db, &blizzard_ids).await
}

pub async fn item_ids_by_blizzard_id<C: ConnectionTrait>(
    db: &C,
    blizzard_ids: &[i64],
) -> Result<HashMap<i64, i64>> {
    let mut ids = HashMap::with_capacity(blizzard_ids.len());
    for chunk in blizzard_ids.chunks(UPSERT_CHUNK) {
        let found: Vec<(i64, i64)> = Item::find()
            .select_only()
            .column(item::Column::BlizzardId)
            .column(item::Column::Id)
            .filter(item::Column::BlizzardId.is_in(chunk.iter().copied()))
            .into_tuple()
            .all(db)
            .await?;
        ids.extend(found);
    }
    Ok(ids)
}

/// Items whose media has never been fetched, optionally restricted to `ids`.
pub async fn items_missing_meta<C: ConnectionTrait>(
    db: &C,
    ids: Option<&[i64]>,
    limit: Option<u64>,
) -> Result<Vec<item::Model>> {
    let mut query = Item::find()
        .filter(item::Column::MetaSyncedAt.is_null())
        .order_by_asc(item::Column::Id);
    if let Some(ids) = ids {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        query = query.filter(item::Column::Id.is_in(ids.iter().copied()));
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    Ok(query.all(db).await?)
}

/// Record a media fetch. `icon_url` is `None` when upstream has no media.
pub async fn mark_item_meta_synced<C: ConnectionTrait>(
    db: &C,
    id: i64,
    icon_url: Option<String>,
) -> Result<()> {
    let now = Utc::now().fixed_offset();
    let mut changes = item::ActiveModel {
        meta_synced_at: Set(Some(now)),
        updated_at: Set(now),
        ..Default::default()
    };
    if icon_url.is_some() {
        changes.icon_url = Set(icon_url);
    }
    Item::update_many()
        .set(changes)
        .filter(item::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

// ─── Enchantments ────────────────────────────────────────────────────────────

/// Insert missing enchantments. Returns `blizzard_id -> id`.
pub async fn upsert_enchantments<C: ConnectionTrait>(
    db: &C,
    blizzard_ids: &[i64],
) -> Result<HashMap<i64, i64>> {
    let mut unique: Vec<i64> = blizzard_ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let now = Utc::now().fixed_offset();
    for chunk in unique.chunks(UPSERT_CHUNK) {
        let models: Vec<enchantment::ActiveModel> = chunk
            .iter()
            .map(|&blizzard_id| enchantment::ActiveModel {
                blizzard_id: Set(blizzard_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        with_write_retry("enchantment upsert", || {
            let models = models.clone();
            async move {
                Enchantment::insert_many(models)
                    .on_conflict(
                        OnConflict::column(enchantment::Column::BlizzardId)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
                    .map_err(RepositoryError::from)
            }
        })
        .await?;
    }

    let mut ids = HashMap::with_capacity(unique.len());
    for chunk in unique.chunks(UPSERT_CHUNK) {
        let found: Vec<(i64, i64)> = Enchantment::find()
            .select_only()
            .column(enchantment::Column::BlizzardId)
            .column(enchantment::Column::Id)
            .filter(enchantment::Column::BlizzardId.is_in(chunk.iter().copied()))
            .into_tuple()
            .all(db)
            .await?;
        ids.extend(found);
    }
    Ok(ids)
}

// ─── Talents ─────────────────────────────────────────────────────────────────

/// Insert or refresh talents by (blizzard_id, talent_type).
pub async fn upsert_talents<C: ConnectionTrait>(
    db: &C,
    records: &[TalentRecord],
) -> Result<HashMap<(i64, TalentType), i64>> {
    let mut unique: HashMap<(i64, TalentType), &TalentRecord> = HashMap::new();
    for record in records {
        unique.insert((record.blizzard_id, record.talent_type), record);
    }
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let now = Utc::now().fixed_offset();
    let mut rows: Vec<&TalentRecord> = unique.into_values().collect();
    rows.sort_by_key(|r| (r.blizzard_id, r.talent_type.to_string()));

    for chunk in rows.chunks(UPSERT_CHUNK) {
        let models: Vec<talent::ActiveModel> = chunk
            .iter()
            .map(|r| talent::ActiveModel {
                blizzard_id: Set(r.blizzard_id),
                talent_type: Set(r.talent_type),
                spell_id: Set(r.spell_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        with_write_retry("talent upsert", || {
            let models = models.clone();
            async move {
                Talent::insert_many(models)
                    .on_conflict(
                        OnConflict::columns([
                            talent::Column::BlizzardId,
                            talent::Column::TalentType,
                        ])
                        .update_columns([talent::Column::SpellId, talent::Column::UpdatedAt])
                        .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
                    .map_err(RepositoryError::from)
            }
        })
        .await?;
    }

    let blizzard_ids: Vec<i64> = rows.iter().map(|r| r.blizzard_id).collect();
    let mut ids = HashMap::with_capacity(rows.len());
    for chunk in blizzard_ids.chunks(UPSERT_CHUNK) {
        let found: Vec<talent::Model> = Talent::find()
            .filter(talent::Column::BlizzardId.is_in(chunk.iter().copied()))
            .all(db)
            .await?;
        for model in found {
            ids.insert((model.blizzard_id, model.talent_type), model.id);
        }
    }
    Ok(ids)
}

// ─── Translations ────────────────────────────────────────────────────────────

/// Upsert localized strings for one owner type (see
/// [`crate::entity::translation::owner`]).
pub async fn upsert_translations<C: ConnectionTrait>(
    db: &C,
    translatable_type: &str,
    records: &[TranslationRecord],
) -> Result<u64> {
    let mut unique: HashMap<(i64, &str, &str), &TranslationRecord> = HashMap::new();
    for record in records {
        unique.insert(
            (record.translatable_id, record.key.as_str(), record.locale.as_str()),
            record,
        );
    }
    if unique.is_empty() {
        return Ok(0);
    }

    let now = Utc::now().fixed_offset();
    let rows: Vec<&TranslationRecord> = unique.into_values().collect();
    let mut written = 0u64;

    for chunk in rows.chunks(UPSERT_CHUNK) {
        let models: Vec<translation::ActiveModel> = chunk
            .iter()
            .map(|r| translation::ActiveModel {
                translatable_type: Set(translatable_type.to_string()),
                translatable_id: Set(r.translatable_id),
                key: Set(r.key.clone()),
                locale: Set(r.locale.clone()),
                value: Set(r.value.clone()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        written += with_write_retry("translation upsert", || {
            let models = models.clone();
            async move {
                Translation::insert_many(models)
                    .on_conflict(
                        OnConflict::columns([
                            translation::Column::TranslatableType,
                            translation::Column::TranslatableId,
                            translation::Column::Key,
                            translation::Column::Locale,
                        ])
                        .update_columns([translation::Column::Value, translation::Column::UpdatedAt])
                        .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
                    .map_err(RepositoryError::from)
            }
        })
        .await?;
    }

    Ok(written)
}

/// Look up one translation.
pub async fn find_translation<C: ConnectionTrait>(
    db: &C,
    translatable_type: &str,
    translatable_id: i64,
    key: &str,
    locale: &str,
) -> Result<Option<String>> {
    Ok(Translation::find()
        .filter(translation::Column::TranslatableType.eq(translatable_type))
        .filter(translation::Column::TranslatableId.eq(translatable_id))
        .filter(translation::Column::Key.eq(key))
        .filter(translation::Column::Locale.eq(locale))
        .one(db)
        .await?
        .map(|t| t.value))
}

// ─── Character gear ──────────────────────────────────────────────────────────

/// Replace a character's gear with `records`.
pub async fn replace_character_items<C: ConnectionTrait>(
    db: &C,
    character_id: i64,
    records: &[CharacterItemRecord],
) -> Result<u64> {
    CharacterItem::delete_many()
        .filter(character_item::Column::CharacterId.eq(character_id))
        .exec(db)
        .await?;

    if records.is_empty() {
        return Ok(0);
    }

    let now = Utc::now().fixed_offset();
    let models: Vec<character_item::ActiveModel> = records
        .iter()
        .map(|r| character_item::ActiveModel {
            character_id: Set(character_id),
            slot: Set(r.slot.clone()),
            item_id: Set(r.item_id),
            item_level: Set(r.item_level),
            enchantment_id: Set(r.enchantment_id),
            sockets: Set(r.sockets.clone()),
            bonus_list: Set(r.bonus_list.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .collect();

    let count = models.len() as u64;
    CharacterItem::insert_many(models)
        .exec_without_returning(db)
        .await?;
    Ok(count)
}

pub async fn character_items<C: ConnectionTrait>(
    db: &C,
    character_id: i64,
) -> Result<Vec<character_item::Model>> {
    Ok(CharacterItem::find()
        .filter(character_item::Column::CharacterId.eq(character_id))
        .order_by_asc(character_item::Column::Slot)
        .all(db)
        .await?)
}
