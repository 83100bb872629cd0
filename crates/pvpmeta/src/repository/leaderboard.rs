//! Seasons, leaderboards and leaderboard entries.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait, sea_query::OnConflict,
};
use serde_json::Value as Json;

use crate::entity::pvp_leaderboard::{self, Entity as PvpLeaderboard};
use crate::entity::pvp_leaderboard_entry::{self, Entity as PvpLeaderboardEntry};
use crate::entity::pvp_season::{self, Entity as PvpSeason};

use super::errors::{RepositoryError, Result, with_write_retry};

/// Snapshots kept per character per leaderboard.
pub const SNAPSHOTS_TO_KEEP: usize = 3;

const CHUNK: usize = 500;

/// Standing of one character on one leaderboard at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEntry {
    pub character_id: i64,
    pub rank: i32,
    pub rating: i32,
    pub wins: i32,
    pub losses: i32,
}

/// Equipment half of an entry's enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentAttrs {
    pub item_level: Option<i32>,
    pub tier_set_id: Option<i64>,
    pub tier_set_name: Option<String>,
    pub tier_set_pieces: Option<i32>,
    pub tier_4p_active: Option<bool>,
    pub raw_equipment: Option<Json>,
    pub processed_at: Option<DateTime<FixedOffset>>,
}

impl EquipmentAttrs {
    /// Copy of an already processed entry's equipment columns.
    pub fn from_entry(entry: &pvp_leaderboard_entry::Model) -> Self {
        Self {
            item_level: entry.item_level,
            tier_set_id: entry.tier_set_id,
            tier_set_name: entry.tier_set_name.clone(),
            tier_set_pieces: entry.tier_set_pieces,
            tier_4p_active: entry.tier_4p_active,
            raw_equipment: entry.raw_equipment.clone(),
            processed_at: entry.equipment_processed_at,
        }
    }
}

/// Specialization half of an entry's enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecializationAttrs {
    pub spec_id: Option<i32>,
    pub hero_talent_tree_id: Option<i64>,
    pub hero_talent_tree_name: Option<String>,
    pub raw_specialization: Option<Json>,
    pub processed_at: Option<DateTime<FixedOffset>>,
}

impl SpecializationAttrs {
    pub fn from_entry(entry: &pvp_leaderboard_entry::Model) -> Self {
        Self {
            spec_id: entry.spec_id,
            hero_talent_tree_id: entry.hero_talent_tree_id,
            hero_talent_tree_name: entry.hero_talent_tree_name.clone(),
            raw_specialization: entry.raw_specialization.clone(),
            processed_at: entry.specialization_processed_at,
        }
    }
}

/// An entry together with the bracket of its leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketEntry {
    pub bracket: String,
    pub entry: pvp_leaderboard_entry::Model,
}

// ─── Seasons ─────────────────────────────────────────────────────────────────

pub async fn current_season<C: ConnectionTrait>(db: &C) -> Result<Option<pvp_season::Model>> {
    Ok(PvpSeason::find()
        .filter(pvp_season::Column::IsCurrent.eq(true))
        .order_by_desc(pvp_season::Column::BlizzardId)
        .one(db)
        .await?)
}

/// Insert a season or rename an existing one.
pub async fn upsert_season<C: ConnectionTrait>(
    db: &C,
    blizzard_id: i64,
    display_name: &str,
) -> Result<pvp_season::Model> {
    let now = Utc::now().fixed_offset();
    let model = pvp_season::ActiveModel {
        blizzard_id: Set(blizzard_id),
        display_name: Set(display_name.to_string()),
        is_current: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    PvpSeason::insert(model)
        .on_conflict(
            OnConflict::column(pvp_season::Column::BlizzardId)
                .update_columns([
                    pvp_season::Column::DisplayName,
                    pvp_season::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    PvpSeason::find()
        .filter(pvp_season::Column::BlizzardId.eq(blizzard_id))
        .one(db)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            context: format!("pvp_seasons blizzard_id={}", blizzard_id),
        })
}

/// Make `season_id` the only current season.
pub async fn set_current_season<C>(db: &C, season_id: i64) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let now = Utc::now().fixed_offset();

    PvpSeason::update_many()
        .set(pvp_season::ActiveModel {
            is_current: Set(false),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(pvp_season::Column::IsCurrent.eq(true))
        .exec(&txn)
        .await?;

    let updated = PvpSeason::update_many()
        .set(pvp_season::ActiveModel {
            is_current: Set(true),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(pvp_season::Column::Id.eq(season_id))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        txn.rollback().await?;
        return Err(RepositoryError::not_found_by_id("pvp_seasons", season_id));
    }

    txn.commit().await?;
    Ok(())
}

pub async fn find_season_by_blizzard_id<C: ConnectionTrait>(
    db: &C,
    blizzard_id: i64,
) -> Result<Option<pvp_season::Model>> {
    Ok(PvpSeason::find()
        .filter(pvp_season::Column::BlizzardId.eq(blizzard_id))
        .one(db)
        .await?)
}

// ─── Leaderboards ────────────────────────────────────────────────────────────

/// Leaderboard for (season, bracket, region), created if missing.
pub async fn find_or_create_leaderboard<C: ConnectionTrait>(
    db: &C,
    season_id: i64,
    bracket: &str,
    region: &str,
) -> Result<pvp_leaderboard::Model> {
    let lookup = || {
        PvpLeaderboard::find()
            .filter(pvp_leaderboard::Column::PvpSeasonId.eq(season_id))
            .filter(pvp_leaderboard::Column::Bracket.eq(bracket))
            .filter(pvp_leaderboard::Column::Region.eq(region))
    };

    if let Some(existing) = lookup().one(db).await? {
        return Ok(existing);
    }

    let now = Utc::now().fixed_offset();
    PvpLeaderboard::insert(pvp_leaderboard::ActiveModel {
        pvp_season_id: Set(season_id),
        bracket: Set(bracket.to_string()),
        region: Set(region.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            pvp_leaderboard::Column::PvpSeasonId,
            pvp_leaderboard::Column::Bracket,
            pvp_leaderboard::Column::Region,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    lookup()
        .one(db)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            context: format!("pvp_leaderboards {}/{}/{}", season_id, bracket, region),
        })
}

pub async fn mark_leaderboard_synced<C: ConnectionTrait>(
    db: &C,
    leaderboard_id: i64,
    at: DateTime<FixedOffset>,
) -> Result<()> {
    PvpLeaderboard::update_many()
        .set(pvp_leaderboard::ActiveModel {
            last_synced_at: Set(Some(at)),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        })
        .filter(pvp_leaderboard::Column::Id.eq(leaderboard_id))
        .exec(db)
        .await?;
    Ok(())
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// Append one snapshot row per entry.
pub async fn insert_entries<C: ConnectionTrait>(
    db: &C,
    leaderboard_id: i64,
    snapshot_at: DateTime<FixedOffset>,
    entries: &[NewEntry],
) -> Result<u64> {
    let now = Utc::now().fixed_offset();
    let mut written = 0u64;

    for chunk in entries.chunks(CHUNK) {
        let models: Vec<pvp_leaderboard_entry::ActiveModel> = chunk
            .iter()
            .map(|e| pvp_leaderboard_entry::ActiveModel {
                pvp_leaderboard_id: Set(leaderboard_id),
                character_id: Set(e.character_id),
                rank: Set(e.rank),
                rating: Set(e.rating),
                wins: Set(e.wins),
                losses: Set(e.losses),
                snapshot_at: Set(snapshot_at),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        written += with_write_retry("entry insert", || {
            let models = models.clone();
            async move {
                PvpLeaderboardEntry::insert_many(models)
                    .exec_without_returning(db)
                    .await
                    .map_err(RepositoryError::from)
            }
        })
        .await?;
    }

    Ok(written)
}

/// Delete all but the newest `keep` snapshots of each character on a
/// leaderboard. Returns the number of rows deleted.
pub async fn prune_snapshots<C: ConnectionTrait>(
    db: &C,
    leaderboard_id: i64,
    character_ids: &[i64],
    keep: usize,
) -> Result<u64> {
    let mut deleted = 0u64;

    for chunk in character_ids.chunks(CHUNK) {
        let rows: Vec<(i64, i64, DateTime<FixedOffset>)> = PvpLeaderboardEntry::find()
            .select_only()
            .column(pvp_leaderboard_entry::Column::Id)
            .column(pvp_leaderboard_entry::Column::CharacterId)
            .column(pvp_leaderboard_entry::Column::SnapshotAt)
            .filter(pvp_leaderboard_entry::Column::PvpLeaderboardId.eq(leaderboard_id))
            .filter(pvp_leaderboard_entry::Column::CharacterId.is_in(chunk.iter().copied()))
            .order_by_asc(pvp_leaderboard_entry::Column::CharacterId)
            .order_by_desc(pvp_leaderboard_entry::Column::SnapshotAt)
            .order_by_desc(pvp_leaderboard_entry::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        let stale = snapshots_beyond(&rows, keep);
        for ids in stale.chunks(CHUNK) {
            let result = PvpLeaderboardEntry::delete_many()
                .filter(pvp_leaderboard_entry::Column::Id.is_in(ids.iter().copied()))
                .exec(db)
                .await?;
            deleted += result.rows_affected;
        }
    }

    Ok(deleted)
}

/// Rows written by [`store_snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotWrite {
    pub inserted: u64,
    pub pruned: u64,
}

/// Insert a snapshot, stamp the leaderboard synced and prune old snapshots of
/// the same characters, all in one transaction.
pub async fn store_snapshot<C>(
    db: &C,
    leaderboard_id: i64,
    snapshot_at: DateTime<FixedOffset>,
    entries: &[NewEntry],
    keep: usize,
) -> Result<SnapshotWrite>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let inserted = insert_entries(&txn, leaderboard_id, snapshot_at, entries).await?;
    mark_leaderboard_synced(&txn, leaderboard_id, Utc::now().fixed_offset()).await?;
    let character_ids: Vec<i64> = entries.iter().map(|e| e.character_id).collect();
    let pruned = prune_snapshots(&txn, leaderboard_id, &character_ids, keep).await?;

    txn.commit().await?;
    Ok(SnapshotWrite { inserted, pruned })
}

/// Ids past the first `keep` rows per character. Rows must be grouped by
/// character and sorted newest first within each group.
fn snapshots_beyond(rows: &[(i64, i64, DateTime<FixedOffset>)], keep: usize) -> Vec<i64> {
    let mut seen: HashMap<i64, usize> = HashMap::new();
    rows.iter()
        .filter_map(|(id, character_id, _)| {
            let count = seen.entry(*character_id).or_insert(0);
            *count += 1;
            (*count > keep).then_some(*id)
        })
        .collect()
}

/// Characters among `ids` with any entry processed after `cutoff`.
pub async fn recently_processed_character_ids<C: ConnectionTrait>(
    db: &C,
    ids: &[i64],
    cutoff: DateTime<FixedOffset>,
) -> Result<HashSet<i64>> {
    let mut found = HashSet::new();
    for chunk in ids.chunks(CHUNK) {
        let rows: Vec<i64> = PvpLeaderboardEntry::find()
            .select_only()
            .column(pvp_leaderboard_entry::Column::CharacterId)
            .distinct()
            .filter(pvp_leaderboard_entry::Column::CharacterId.is_in(chunk.iter().copied()))
            .filter(pvp_leaderboard_entry::Column::EquipmentProcessedAt.gt(cutoff))
            .into_tuple()
            .all(db)
            .await?;
        found.extend(rows);
    }
    Ok(found)
}

/// Every entry of a character with its bracket, newest snapshot first.
pub async fn entries_for_character<C: ConnectionTrait>(
    db: &C,
    character_id: i64,
) -> Result<Vec<BracketEntry>> {
    let rows = PvpLeaderboardEntry::find()
        .filter(pvp_leaderboard_entry::Column::CharacterId.eq(character_id))
        .find_also_related(PvpLeaderboard)
        .order_by_desc(pvp_leaderboard_entry::Column::SnapshotAt)
        .order_by_desc(pvp_leaderboard_entry::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(entry, board)| {
            board.map(|b| BracketEntry {
                bracket: b.bracket,
                entry,
            })
        })
        .collect())
}

/// Newest entry per bracket. Input must be sorted newest first.
pub fn latest_per_bracket(entries: &[BracketEntry]) -> Vec<&BracketEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(e.bracket.as_str()))
        .collect()
}

/// The most recently processed entry of a character, if any.
pub async fn latest_processed_entry<C: ConnectionTrait>(
    db: &C,
    character_id: i64,
) -> Result<Option<pvp_leaderboard_entry::Model>> {
    Ok(PvpLeaderboardEntry::find()
        .filter(pvp_leaderboard_entry::Column::CharacterId.eq(character_id))
        .filter(pvp_leaderboard_entry::Column::EquipmentProcessedAt.is_not_null())
        .order_by_desc(pvp_leaderboard_entry::Column::EquipmentProcessedAt)
        .order_by_desc(pvp_leaderboard_entry::Column::Id)
        .one(db)
        .await?)
}

/// Write enrichment columns to the given entries. A `None` half is left as is.
pub async fn apply_entry_attrs<C: ConnectionTrait>(
    db: &C,
    entry_ids: &[i64],
    equipment: Option<&EquipmentAttrs>,
    specialization: Option<&SpecializationAttrs>,
) -> Result<u64> {
    if entry_ids.is_empty() || (equipment.is_none() && specialization.is_none()) {
        return Ok(0);
    }

    let mut changes = pvp_leaderboard_entry::ActiveModel {
        updated_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };
    if let Some(eq) = equipment {
        changes.item_level = Set(eq.item_level);
        changes.tier_set_id = Set(eq.tier_set_id);
        changes.tier_set_name = Set(eq.tier_set_name.clone());
        changes.tier_set_pieces = Set(eq.tier_set_pieces);
        changes.tier_4p_active = Set(eq.tier_4p_active);
        changes.raw_equipment = Set(eq.raw_equipment.clone());
        changes.equipment_processed_at = Set(eq.processed_at);
    }
    if let Some(spec) = specialization {
        changes.spec_id = Set(spec.spec_id);
        changes.hero_talent_tree_id = Set(spec.hero_talent_tree_id);
        changes.hero_talent_tree_name = Set(spec.hero_talent_tree_name.clone());
        changes.raw_specialization = Set(spec.raw_specialization.clone());
        changes.specialization_processed_at = Set(spec.processed_at);
    }

    let result = PvpLeaderboardEntry::update_many()
        .set(changes)
        .filter(pvp_leaderboard_entry::Column::Id.is_in(entry_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Entries of a leaderboard, best rank first.
pub async fn entries_for_leaderboard<C: ConnectionTrait>(
    db: &C,
    leaderboard_id: i64,
) -> Result<Vec<pvp_leaderboard_entry::Model>> {
    Ok(PvpLeaderboardEntry::find()
        .filter(pvp_leaderboard_entry::Column::PvpLeaderboardId.eq(leaderboard_id))
        .order_by_asc(pvp_leaderboard_entry::Column::Rank)
        .order_by_asc(pvp_leaderboard_entry::Column::Id)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(id: i64, bracket: &str, snapshot_offset_min: i64) -> BracketEntry {
        let base = Utc::now().fixed_offset();
        BracketEntry {
            bracket: bracket.to_string(),
            entry: pvp_leaderboard_entry::Model {
                id,
                pvp_leaderboard_id: 1,
                character_id: 1,
                rank: 1,
                rating: 2000,
                wins: 0,
                losses: 0,
                snapshot_at: base - Duration::minutes(snapshot_offset_min),
                item_level: None,
                tier_set_id: None,
                tier_set_name: None,
                tier_set_pieces: None,
                tier_4p_active: None,
                raw_equipment: None,
                equipment_processed_at: None,
                spec_id: None,
                hero_talent_tree_id: None,
                hero_talent_tree_name: None,
                raw_specialization: None,
                specialization_processed_at: None,
                created_at: base,
                updated_at: base,
            },
        }
    }

    #[test]
    fn latest_per_bracket_takes_first_of_each() {
        let entries = vec![
            entry(5, "3v3", 0),
            entry(4, "2v2", 1),
            entry(3, "3v3", 60),
            entry(2, "2v2", 60),
        ];
        let latest: Vec<i64> = latest_per_bracket(&entries)
            .iter()
            .map(|e| e.entry.id)
            .collect();
        assert_eq!(latest, vec![5, 4]);
    }

    #[test]
    fn snapshots_beyond_keeps_newest_per_character() {
        let t = Utc::now().fixed_offset();
        let rows = vec![
            (10, 1, t),
            (9, 1, t - Duration::hours(1)),
            (8, 1, t - Duration::hours(2)),
            (7, 1, t - Duration::hours(3)),
            (6, 1, t - Duration::hours(4)),
            (5, 2, t),
            (4, 2, t - Duration::hours(1)),
        ];
        assert_eq!(snapshots_beyond(&rows, 3), vec![7, 6]);
        assert!(snapshots_beyond(&rows, 5).is_empty());
    }

    #[test]
    fn attrs_round_trip_from_entry() {
        let mut e = entry(1, "3v3", 0).entry;
        e.item_level = Some(636);
        e.spec_id = Some(62);
        e.equipment_processed_at = Some(Utc::now().fixed_offset());

        let eq = EquipmentAttrs::from_entry(&e);
        let spec = SpecializationAttrs::from_entry(&e);
        assert_eq!(eq.item_level, Some(636));
        assert_eq!(eq.processed_at, e.equipment_processed_at);
        assert_eq!(spec.spec_id, Some(62));
    }
}
