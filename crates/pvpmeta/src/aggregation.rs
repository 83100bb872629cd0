//! Popularity aggregation over the top of each (bracket, spec) ladder.
//!
//! For a season the cohort is built once: processed entries of the current
//! snapshot, best rating per (bracket, character), ranked per (bracket, spec)
//! with shared ranks for ties, cut at `top_n`. Item, enchant and gem usage is
//! then tallied from the cohort's stored gear and each table is replaced in
//! its own transaction.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};

use crate::entity::character_item::{self, Entity as CharacterItem};
use crate::entity::pvp_leaderboard::{self, Entity as PvpLeaderboard};
use crate::entity::pvp_leaderboard_entry::{self, Entity as PvpLeaderboardEntry};
use crate::entity::{enchant_popularity, gem_popularity, item_popularity};
use crate::repository::Result;
use crate::repository::popularity;

const CHUNK: usize = 500;

/// Rows written per popularity table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationCounts {
    pub items: u64,
    pub enchants: u64,
    pub gems: u64,
}

impl AggregationCounts {
    pub fn total(&self) -> u64 {
        self.items + self.enchants + self.gems
    }
}

/// A character counted for one (bracket, spec).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortMember {
    pub character_id: i64,
    pub bracket: String,
    pub spec_id: i32,
    pub rating: i32,
    /// Shared by equal ratings.
    pub rank: usize,
}

/// One processed entry, as read for cohort selection.
#[derive(Debug, Clone)]
pub struct RankedEntry {
    pub leaderboard_id: i64,
    pub bracket: String,
    pub character_id: i64,
    pub rating: i32,
    pub spec_id: i32,
    pub snapshot_at: DateTime<FixedOffset>,
}

/// The stored gear of one character slot, reduced to what is tallied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GearSlot {
    pub character_id: i64,
    pub slot: String,
    pub item_id: i64,
    pub enchantment_id: Option<i64>,
    /// `(socket_type, gem item id)` of filled sockets.
    pub gems: Vec<(String, i64)>,
}

impl From<character_item::Model> for GearSlot {
    fn from(model: character_item::Model) -> Self {
        let gems = model
            .socket_list()
            .into_iter()
            .filter_map(|s| Some((s.socket_type, s.item_id?)))
            .collect();
        Self {
            character_id: model.character_id,
            slot: model.slot,
            item_id: model.item_id,
            enchantment_id: model.enchantment_id,
            gems,
        }
    }
}

/// One tallied usage row.
#[derive(Debug, Clone, PartialEq)]
pub struct Usage {
    pub bracket: String,
    pub spec_id: i32,
    pub slot: String,
    /// Gems only.
    pub socket_type: Option<String>,
    pub target_id: i64,
    pub count: usize,
    pub pct: f64,
}

/// Recompute item, enchant and gem popularity of a season.
///
/// Idempotent: every run replaces all rows of the season.
#[tracing::instrument(skip(db))]
pub async fn run_aggregations<C>(db: &C, season_id: i64, top_n: usize) -> Result<AggregationCounts>
where
    C: ConnectionTrait + TransactionTrait,
{
    let entries = load_processed_entries(db, season_id).await?;
    let cohort = select_cohort(entries, top_n);

    let mut character_ids: Vec<i64> = cohort.iter().map(|m| m.character_id).collect();
    character_ids.sort_unstable();
    character_ids.dedup();
    let gear = load_gear(db, &character_ids).await?;

    tracing::debug!(
        season_id,
        cohort = cohort.len(),
        characters = character_ids.len(),
        slots = gear.len(),
        "Aggregation cohort loaded"
    );

    let snapshot_at = Utc::now().fixed_offset();
    let item_rows = tally_items(&cohort, &gear)
        .into_iter()
        .map(|u| item_popularity::ActiveModel {
            pvp_season_id: Set(season_id),
            bracket: Set(u.bracket),
            spec_id: Set(u.spec_id),
            slot: Set(u.slot),
            item_id: Set(u.target_id),
            usage_count: Set(count_i32(u.count)),
            usage_pct: Set(u.pct),
            snapshot_at: Set(snapshot_at),
            ..Default::default()
        })
        .collect();
    let enchant_rows = tally_enchants(&cohort, &gear)
        .into_iter()
        .map(|u| enchant_popularity::ActiveModel {
            pvp_season_id: Set(season_id),
            bracket: Set(u.bracket),
            spec_id: Set(u.spec_id),
            slot: Set(u.slot),
            enchantment_id: Set(u.target_id),
            usage_count: Set(count_i32(u.count)),
            usage_pct: Set(u.pct),
            snapshot_at: Set(snapshot_at),
            ..Default::default()
        })
        .collect();
    let gem_rows = tally_gems(&cohort, &gear)
        .into_iter()
        .map(|u| gem_popularity::ActiveModel {
            pvp_season_id: Set(season_id),
            bracket: Set(u.bracket),
            spec_id: Set(u.spec_id),
            slot: Set(u.slot),
            socket_type: Set(u.socket_type.unwrap_or_default()),
            item_id: Set(u.target_id),
            usage_count: Set(count_i32(u.count)),
            usage_pct: Set(u.pct),
            snapshot_at: Set(snapshot_at),
            ..Default::default()
        })
        .collect();

    let (items, enchants, gems) = tokio::try_join!(
        popularity::replace_item_popularity(db, season_id, item_rows),
        popularity::replace_enchant_popularity(db, season_id, enchant_rows),
        popularity::replace_gem_popularity(db, season_id, gem_rows),
    )?;

    let counts = AggregationCounts {
        items,
        enchants,
        gems,
    };
    tracing::info!(
        season_id,
        items = counts.items,
        enchants = counts.enchants,
        gems = counts.gems,
        "Aggregations complete"
    );
    Ok(counts)
}

fn count_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// `count / total` as a percentage rounded to two decimals.
pub fn usage_pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 10_000.0 / total as f64).round() / 100.0
}

async fn load_processed_entries<C: ConnectionTrait>(
    db: &C,
    season_id: i64,
) -> Result<Vec<RankedEntry>> {
    let brackets: HashMap<i64, String> = PvpLeaderboard::find()
        .select_only()
        .column(pvp_leaderboard::Column::Id)
        .column(pvp_leaderboard::Column::Bracket)
        .filter(pvp_leaderboard::Column::PvpSeasonId.eq(season_id))
        .into_tuple::<(i64, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    if brackets.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(i64, i64, i32, Option<i32>, DateTime<FixedOffset>)> =
        PvpLeaderboardEntry::find()
            .select_only()
            .column(pvp_leaderboard_entry::Column::PvpLeaderboardId)
            .column(pvp_leaderboard_entry::Column::CharacterId)
            .column(pvp_leaderboard_entry::Column::Rating)
            .column(pvp_leaderboard_entry::Column::SpecId)
            .column(pvp_leaderboard_entry::Column::SnapshotAt)
            .filter(pvp_leaderboard_entry::Column::PvpLeaderboardId.is_in(brackets.keys().copied()))
            .filter(pvp_leaderboard_entry::Column::SpecId.is_not_null())
            .filter(pvp_leaderboard_entry::Column::EquipmentProcessedAt.is_not_null())
            .into_tuple()
            .all(db)
            .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(leaderboard_id, character_id, rating, spec_id, snapshot_at)| {
            Some(RankedEntry {
                leaderboard_id,
                bracket: brackets.get(&leaderboard_id)?.clone(),
                character_id,
                rating,
                spec_id: spec_id?,
                snapshot_at,
            })
        })
        .collect())
}

async fn load_gear<C: ConnectionTrait>(db: &C, character_ids: &[i64]) -> Result<Vec<GearSlot>> {
    let mut gear = Vec::new();
    for chunk in character_ids.chunks(CHUNK) {
        let rows = CharacterItem::find()
            .filter(character_item::Column::CharacterId.is_in(chunk.iter().copied()))
            .all(db)
            .await?;
        gear.extend(rows.into_iter().map(GearSlot::from));
    }
    Ok(gear)
}

/// Pick the counted characters of every (bracket, spec).
///
/// The newest snapshot per (leaderboard, character) is kept; a character on
/// several leaderboards of a bracket counts once, with its best rating.
pub fn select_cohort(entries: Vec<RankedEntry>, top_n: usize) -> Vec<CohortMember> {
    let mut current: HashMap<(i64, i64), RankedEntry> = HashMap::new();
    for entry in entries {
        let key = (entry.leaderboard_id, entry.character_id);
        match current.get(&key) {
            Some(existing) if existing.snapshot_at >= entry.snapshot_at => {}
            _ => {
                current.insert(key, entry);
            }
        }
    }

    let mut best: HashMap<(String, i64), RankedEntry> = HashMap::new();
    for entry in current.into_values() {
        let key = (entry.bracket.clone(), entry.character_id);
        match best.get(&key) {
            Some(existing) if existing.rating >= entry.rating => {}
            _ => {
                best.insert(key, entry);
            }
        }
    }

    let mut ladders: BTreeMap<(String, i32), Vec<RankedEntry>> = BTreeMap::new();
    for entry in best.into_values() {
        ladders
            .entry((entry.bracket.clone(), entry.spec_id))
            .or_default()
            .push(entry);
    }

    let mut cohort = Vec::new();
    for ((bracket, spec_id), mut ladder) in ladders {
        ladder.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then(a.character_id.cmp(&b.character_id))
        });
        let mut rank = 0;
        for (position, entry) in ladder.iter().enumerate() {
            if position == 0 || entry.rating != ladder[position - 1].rating {
                rank = position + 1;
            }
            if rank > top_n {
                break;
            }
            cohort.push(CohortMember {
                character_id: entry.character_id,
                bracket: bracket.clone(),
                spec_id,
                rating: entry.rating,
                rank,
            });
        }
    }
    cohort
}

type SlotKey = (String, i32, String);
type TargetKey = (String, i32, String, Option<String>, i64);

/// Tally distinct characters per target and per slot, then turn the counts
/// into ordered usage rows.
///
/// `pick` returns, for one gear slot, the targets it contributes. A slot
/// counts towards its slot total when it contributes at least one target.
fn tally<F>(cohort: &[CohortMember], gear: &[GearSlot], pick: F) -> Vec<Usage>
where
    F: Fn(&GearSlot) -> Vec<(Option<String>, i64)>,
{
    let mut by_character: HashMap<i64, Vec<&GearSlot>> = HashMap::new();
    for slot in gear {
        by_character.entry(slot.character_id).or_default().push(slot);
    }

    let mut slot_totals: HashMap<SlotKey, usize> = HashMap::new();
    let mut target_counts: HashMap<TargetKey, usize> = HashMap::new();

    for member in cohort {
        let Some(slots) = by_character.get(&member.character_id) else {
            continue;
        };
        for slot in slots {
            let mut targets = pick(slot);
            if targets.is_empty() {
                continue;
            }
            targets.sort();
            targets.dedup();

            let slot_key = (member.bracket.clone(), member.spec_id, slot.slot.clone());
            *slot_totals.entry(slot_key).or_default() += 1;
            for (socket_type, target_id) in targets {
                let key = (
                    member.bracket.clone(),
                    member.spec_id,
                    slot.slot.clone(),
                    socket_type,
                    target_id,
                );
                *target_counts.entry(key).or_default() += 1;
            }
        }
    }

    let mut rows: Vec<Usage> = target_counts
        .into_iter()
        .map(|((bracket, spec_id, slot, socket_type, target_id), count)| {
            let total = slot_totals
                .get(&(bracket.clone(), spec_id, slot.clone()))
                .copied()
                .unwrap_or(count);
            Usage {
                pct: usage_pct(count, total),
                bracket,
                spec_id,
                slot,
                socket_type,
                target_id,
                count,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.bracket
            .cmp(&b.bracket)
            .then(a.spec_id.cmp(&b.spec_id))
            .then(a.slot.cmp(&b.slot))
            .then(a.socket_type.cmp(&b.socket_type))
            .then(b.count.cmp(&a.count))
            .then(a.target_id.cmp(&b.target_id))
    });
    rows
}

pub fn tally_items(cohort: &[CohortMember], gear: &[GearSlot]) -> Vec<Usage> {
    tally(cohort, gear, |slot| vec![(None, slot.item_id)])
}

pub fn tally_enchants(cohort: &[CohortMember], gear: &[GearSlot]) -> Vec<Usage> {
    tally(cohort, gear, |slot| {
        slot.enchantment_id
            .map(|id| vec![(None, id)])
            .unwrap_or_default()
    })
}

/// A gem socketed twice in one slot counts once for that character.
pub fn tally_gems(cohort: &[CohortMember], gear: &[GearSlot]) -> Vec<Usage> {
    tally(cohort, gear, |slot| {
        let unique: HashSet<(String, i64)> = slot.gems.iter().cloned().collect();
        unique
            .into_iter()
            .map(|(socket_type, gem)| (Some(socket_type), gem))
            .collect()
    })
}
