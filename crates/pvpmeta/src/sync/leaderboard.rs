//! Bracket discovery and leaderboard ingestion.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::blizzard::BlizzardClient;
use crate::blizzard::types::{Leaderboard, LeaderboardEntry};
use crate::entity::faction::Faction;
use crate::entity::pvp_season;
use crate::policy::{BracketPolicy, is_syncable, policy_for};
use crate::repository::character::{self as character_repo, CharacterSeed};
use crate::repository::leaderboard::{self as leaderboard_repo, NewEntry, SNAPSHOTS_TO_KEEP};

use super::context::SyncContext;
use super::errors::Result;
use super::types::LeaderboardSyncResult;

/// Syncable brackets listed in the season's leaderboards index.
///
/// A failed index fetch is logged and yields no brackets.
pub async fn discover_brackets(client: &BlizzardClient, season_blizzard_id: i64) -> Vec<String> {
    match client.leaderboards_index(season_blizzard_id).await {
        Ok(index) => {
            let mut brackets: Vec<String> = index
                .leaderboards
                .into_iter()
                .map(|l| l.name)
                .filter(|name| is_syncable(name))
                .collect();
            brackets.sort();
            brackets.dedup();
            brackets
        }
        Err(e) => {
            tracing::error!(
                region = %client.region(),
                season = season_blizzard_id,
                error = %e,
                "Bracket discovery failed"
            );
            Vec::new()
        }
    }
}

/// Entries that pass the bracket policy: the first `top_n` rows at or above
/// `rating_min`.
pub fn eligible_entries<'a>(board: &'a Leaderboard, policy: &BracketPolicy) -> Vec<&'a LeaderboardEntry> {
    board
        .entries
        .iter()
        .take(policy.top_n)
        .filter(|e| e.rating >= policy.rating_min)
        .collect()
}

fn seed_from_entry(entry: &LeaderboardEntry, region: &str) -> CharacterSeed {
    CharacterSeed {
        blizzard_id: entry.character.id,
        region: region.to_string(),
        realm: entry.character.realm.slug.clone(),
        name: entry.character.name.clone(),
        faction: entry.faction.kind.as_deref().and_then(Faction::from_api),
    }
}

/// One row per character, keeping the best (lowest) rank.
fn dedupe_entries(entries: Vec<NewEntry>) -> Vec<NewEntry> {
    let mut best: HashMap<i64, NewEntry> = HashMap::with_capacity(entries.len());
    for entry in entries {
        best.entry(entry.character_id)
            .and_modify(|existing| {
                if entry.rank < existing.rank {
                    *existing = entry;
                }
            })
            .or_insert(entry);
    }
    let mut out: Vec<NewEntry> = best.into_values().collect();
    out.sort_by_key(|e| (e.rank, e.character_id));
    out
}

/// Fetch one bracket leaderboard and store it as a new snapshot.
#[tracing::instrument(skip(ctx, season, snapshot_at), fields(season = season.blizzard_id))]
pub async fn sync_leaderboard(
    ctx: &SyncContext,
    region: &str,
    season: &pvp_season::Model,
    bracket: &str,
    snapshot_at: DateTime<FixedOffset>,
) -> Result<LeaderboardSyncResult> {
    let client = ctx.client(region)?;
    let db = ctx.db();
    let policy = policy_for(bracket);

    let board = client.leaderboard(season.blizzard_id, bracket).await?;
    let eligible = eligible_entries(&board, &policy);

    let seeds: Vec<CharacterSeed> = eligible
        .iter()
        .filter(|e| e.character.id > 0 && !e.character.realm.slug.is_empty())
        .map(|e| seed_from_entry(e, region))
        .collect();
    let ids = character_repo::upsert_seeds(db, region, &seeds).await?;

    let leaderboard =
        leaderboard_repo::find_or_create_leaderboard(db, season.id, bracket, region).await?;

    let rows: Vec<NewEntry> = eligible
        .iter()
        .filter_map(|e| {
            let character_id = *ids.get(&e.character.id)?;
            Some(NewEntry {
                character_id,
                rank: e.rank,
                rating: e.rating,
                wins: e.season_match_statistics.won,
                losses: e.season_match_statistics.lost,
            })
        })
        .collect();
    let rows = dedupe_entries(rows);

    let written =
        leaderboard_repo::store_snapshot(db, leaderboard.id, snapshot_at, &rows, SNAPSHOTS_TO_KEEP)
            .await?;
    let character_ids: Vec<i64> = rows.iter().map(|r| r.character_id).collect();

    tracing::debug!(
        region,
        bracket,
        fetched = board.entries.len(),
        inserted = written.inserted,
        pruned = written.pruned,
        "Leaderboard synced"
    );

    Ok(LeaderboardSyncResult {
        bracket: bracket.to_string(),
        entries: written.inserted as usize,
        character_ids,
        pruned: written.pruned,
    })
}
