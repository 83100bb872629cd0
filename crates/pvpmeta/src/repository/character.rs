//! Character storage.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::OnConflict,
};

use crate::entity::character::{ActiveModel, Column, Entity as Character, Model};
use crate::entity::faction::Faction;

use super::errors::{RepositoryError, Result, with_write_retry};

/// Rows per multi-row INSERT.
const UPSERT_CHUNK: usize = 500;

/// Identity of a character as listed on a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSeed {
    pub blizzard_id: i64,
    pub region: String,
    pub realm: String,
    pub name: String,
    pub faction: Option<Faction>,
}

/// Profile and media fields written by the metadata sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterMeta {
    pub race: Option<String>,
    pub race_id: Option<i32>,
    pub class_id: Option<i32>,
    pub avatar_url: Option<String>,
    pub inset_url: Option<String>,
    pub main_raw_url: Option<String>,
}

/// Insert or refresh characters by (blizzard_id, region).
///
/// Realm and name are lowercased. Returns `blizzard_id -> id` for every seed.
pub async fn upsert_seeds<C: ConnectionTrait>(
    db: &C,
    region: &str,
    seeds: &[CharacterSeed],
) -> Result<HashMap<i64, i64>> {
    if seeds.is_empty() {
        return Ok(HashMap::new());
    }

    let now = Utc::now().fixed_offset();
    let mut unique: HashMap<i64, &CharacterSeed> = HashMap::new();
    for seed in seeds {
        unique.entry(seed.blizzard_id).or_insert(seed);
    }
    let mut rows: Vec<&CharacterSeed> = unique.into_values().collect();
    rows.sort_by_key(|s| s.blizzard_id);

    for chunk in rows.chunks(UPSERT_CHUNK) {
        let models: Vec<ActiveModel> = chunk
            .iter()
            .map(|seed| ActiveModel {
                blizzard_id: Set(seed.blizzard_id),
                region: Set(region.to_string()),
                realm: Set(seed.realm.to_lowercase()),
                name: Set(seed.name.to_lowercase()),
                faction: Set(seed.faction),
                is_private: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        with_write_retry("character upsert", || {
            let models = models.clone();
            async move {
                Character::insert_many(models)
                    .on_conflict(
                        OnConflict::columns([Column::BlizzardId, Column::Region])
                            .update_columns([
                                Column::Realm,
                                Column::Name,
                                Column::Faction,
                                Column::UpdatedAt,
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

    let blizzard_ids: Vec<i64> = rows.iter().map(|s| s.blizzard_id).collect();
    let mut ids = HashMap::with_capacity(blizzard_ids.len());
    for chunk in blizzard_ids.chunks(UPSERT_CHUNK) {
        let found: Vec<(i64, i64)> = Character::find()
            .select_only()
            .column(Column::BlizzardId)
            .column(Column::Id)
            .filter(Column::Region.eq(region))
            .filter(Column::BlizzardId.is_in(chunk.iter().copied()))
            .into_tuple()
            .all(db)
            .await?;
        ids.extend(found);
    }

    Ok(ids)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Model>> {
    Ok(Character::find_by_id(id).one(db).await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: i64) -> Result<Model> {
    find_by_id(db, id)
        .await?
        .ok_or_else(|| RepositoryError::not_found_by_id("characters", id))
}

/// Characters by id, ordered by id.
pub async fn find_by_ids<C: ConnectionTrait>(db: &C, ids: &[i64]) -> Result<Vec<Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Character::find()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Characters among `ids` that may be fetched now: not private and not in
/// an unavailability cooldown.
pub async fn find_sync_candidates<C: ConnectionTrait>(db: &C, ids: &[i64]) -> Result<Vec<Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let now = Utc::now().fixed_offset();
    Ok(Character::find()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .filter(Column::IsPrivate.eq(false))
        .filter(
            Condition::any()
                .add(Column::UnavailableUntil.is_null())
                .add(Column::UnavailableUntil.lte(now)),
        )
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Ids among `ids` whose metadata is missing or older than `cutoff`.
///
/// Characters on an unavailability cooldown are left out.
pub async fn find_meta_stale<C: ConnectionTrait>(
    db: &C,
    ids: &[i64],
    cutoff: chrono::DateTime<chrono::FixedOffset>,
) -> Result<Vec<i64>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let now = Utc::now().fixed_offset();
    Ok(Character::find()
        .select_only()
        .column(Column::Id)
        .filter(Column::Id.is_in(ids.iter().copied()))
        .filter(Column::IsPrivate.eq(false))
        .filter(
            Condition::any()
                .add(Column::UnavailableUntil.is_null())
                .add(Column::UnavailableUntil.lte(now)),
        )
        .filter(
            Condition::any()
                .add(Column::MetaSyncedAt.is_null())
                .add(Column::MetaSyncedAt.lt(cutoff)),
        )
        .order_by_asc(Column::Id)
        .into_tuple()
        .all(db)
        .await?)
}

/// Put a character on cooldown after upstream reported it missing.
pub async fn mark_unavailable<C: ConnectionTrait>(
    db: &C,
    id: i64,
    until: chrono::DateTime<chrono::FixedOffset>,
) -> Result<()> {
    update_columns(
        db,
        id,
        ActiveModel {
            unavailable_until: Set(Some(until)),
            ..Default::default()
        },
    )
    .await
}

/// Hide a character from every future sync.
pub async fn mark_private<C: ConnectionTrait>(db: &C, id: i64) -> Result<()> {
    let now = Utc::now().fixed_offset();
    update_columns(
        db,
        id,
        ActiveModel {
            is_private: Set(true),
            meta_synced_at: Set(Some(now)),
            ..Default::default()
        },
    )
    .await
}

/// Store profile/media fields and stamp `meta_synced_at`.
pub async fn update_meta<C: ConnectionTrait>(db: &C, id: i64, meta: CharacterMeta) -> Result<()> {
    let now = Utc::now().fixed_offset();
    update_columns(
        db,
        id,
        ActiveModel {
            race: Set(meta.race),
            race_id: Set(meta.race_id),
            class_id: Set(meta.class_id),
            avatar_url: Set(meta.avatar_url),
            inset_url: Set(meta.inset_url),
            main_raw_url: Set(meta.main_raw_url),
            meta_synced_at: Set(Some(now)),
            unavailable_until: Set(None),
            ..Default::default()
        },
    )
    .await
}

/// Apply the set fields of `changes` to one row, bumping `updated_at`.
pub async fn update_columns<C: ConnectionTrait>(
    db: &C,
    id: i64,
    mut changes: ActiveModel,
) -> Result<()> {
    changes.updated_at = Set(Utc::now().fixed_offset());
    let result = Character::update_many()
        .set(changes)
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(RepositoryError::not_found_by_id("characters", id));
    }
    Ok(())
}
