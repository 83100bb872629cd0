//! Integration tests for repository operations.
//!
//! These tests require the `sqlite` and `migrate` features to be enabled
//! and use an in-memory SQLite database.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::time::Duration;

use chrono::Utc;
use pvpmeta::connect_and_migrate;
use pvpmeta::entity::faction::Faction;
use pvpmeta::entity::item_popularity;
use pvpmeta::entity::sync_cycle_status::SyncCycleStatus;
use pvpmeta::entity::talent_type::TalentType;
use pvpmeta::entity::translation::owner;
use pvpmeta::repository::catalog::{
    self, CharacterItemRecord, ItemRecord, TalentRecord, TranslationRecord,
};
use pvpmeta::repository::character::{self as character_repo, CharacterSeed};
use pvpmeta::repository::leaderboard::{self, NewEntry, SNAPSHOTS_TO_KEEP};
use pvpmeta::repository::{Pagination, PopularityFilter, RepositoryError, popularity, sync_cycle};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use serde_json::json;

/// Create an in-memory SQLite database with migrations applied.
async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

fn seed(blizzard_id: i64, name: &str) -> CharacterSeed {
    CharacterSeed {
        blizzard_id,
        region: "us".to_string(),
        realm: "Area-52".to_string(),
        name: name.to_string(),
        faction: Some(Faction::Horde),
    }
}

fn entry(character_id: i64, rank: i32) -> NewEntry {
    NewEntry {
        character_id,
        rank,
        rating: 2400 - rank,
        wins: 10,
        losses: 2,
    }
}

#[tokio::test]
async fn character_upsert_is_idempotent_and_case_insensitive() {
    let db = setup_test_db().await;

    let first = character_repo::upsert_seeds(&db, "us", &[seed(1001, "Zed"), seed(1002, "Ayla")])
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let mut renamed = seed(1001, "ZED");
    renamed.faction = Some(Faction::Alliance);
    let second = character_repo::upsert_seeds(&db, "us", &[renamed]).await.unwrap();
    assert_eq!(second.get(&1001), first.get(&1001));

    let stored = character_repo::get(&db, first[&1001]).await.unwrap();
    assert_eq!(stored.name, "zed");
    assert_eq!(stored.realm, "area-52");
    assert_eq!(stored.faction, Some(Faction::Alliance));

    let eu = character_repo::upsert_seeds(&db, "eu", &[seed(1001, "Zed")]).await.unwrap();
    assert_ne!(eu[&1001], first[&1001], "same upstream id in another region is another row");
}

#[tokio::test]
async fn only_one_season_is_current() {
    let db = setup_test_db().await;

    let s39 = leaderboard::upsert_season(&db, 39, "Season 1").await.unwrap();
    let s40 = leaderboard::upsert_season(&db, 40, "Season 2").await.unwrap();

    leaderboard::set_current_season(&db, s39.id).await.unwrap();
    leaderboard::set_current_season(&db, s40.id).await.unwrap();
    let current = leaderboard::current_season(&db).await.unwrap().unwrap();
    assert_eq!(current.id, s40.id);

    let old = leaderboard::find_season_by_blizzard_id(&db, 39).await.unwrap().unwrap();
    assert!(!old.is_current);

    let err = leaderboard::set_current_season(&db, 9999).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn snapshots_are_pruned_to_the_newest_three() {
    let db = setup_test_db().await;
    let season = leaderboard::upsert_season(&db, 40, "Season 2").await.unwrap();
    let board = leaderboard::find_or_create_leaderboard(&db, season.id, "3v3", "us")
        .await
        .unwrap();
    let again = leaderboard::find_or_create_leaderboard(&db, season.id, "3v3", "us")
        .await
        .unwrap();
    assert_eq!(board.id, again.id);

    let ids = character_repo::upsert_seeds(&db, "us", &[seed(1001, "Zed")]).await.unwrap();
    let character_id = ids[&1001];

    let base = Utc::now().fixed_offset();
    for hours in 0..5 {
        let snapshot_at = base + chrono::Duration::hours(hours);
        leaderboard::insert_entries(&db, board.id, snapshot_at, &[entry(character_id, 1)])
            .await
            .unwrap();
    }

    let pruned = leaderboard::prune_snapshots(&db, board.id, &[character_id], SNAPSHOTS_TO_KEEP)
        .await
        .unwrap();
    assert_eq!(pruned, 2);

    let remaining = leaderboard::entries_for_leaderboard(&db, board.id).await.unwrap();
    assert_eq!(remaining.len(), SNAPSHOTS_TO_KEEP);
    let oldest_kept = remaining.iter().map(|e| e.snapshot_at).min().unwrap();
    assert_eq!(oldest_kept, base + chrono::Duration::hours(2));

    let history = leaderboard::entries_for_character(&db, character_id).await.unwrap();
    let latest = leaderboard::latest_per_bracket(&history);
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].bracket, "3v3");
    assert_eq!(latest[0].entry.snapshot_at, base + chrono::Duration::hours(4));
}

#[tokio::test]
async fn snapshot_write_is_all_or_nothing() {
    let db = setup_test_db().await;
    let season = leaderboard::upsert_season(&db, 40, "Season 2").await.unwrap();
    let board = leaderboard::find_or_create_leaderboard(&db, season.id, "3v3", "us")
        .await
        .unwrap();
    let ids = character_repo::upsert_seeds(&db, "us", &[seed(1001, "Zed")]).await.unwrap();
    let character_id = ids[&1001];

    let base = Utc::now().fixed_offset();
    for hours in 0..3 {
        let written = leaderboard::store_snapshot(
            &db,
            board.id,
            base + chrono::Duration::hours(hours),
            &[entry(character_id, 1)],
            SNAPSHOTS_TO_KEEP,
        )
        .await
        .unwrap();
        assert_eq!(written.inserted, 1);
        assert_eq!(written.pruned, 0);
    }
    let synced = leaderboard::find_or_create_leaderboard(&db, season.id, "3v3", "us")
        .await
        .unwrap()
        .last_synced_at;
    assert!(synced.is_some());

    // The fourth snapshot needs a prune, which this trigger rejects.
    db.execute_unprepared(
        "CREATE TRIGGER block_prune BEFORE DELETE ON pvp_leaderboard_entries \
         BEGIN SELECT RAISE(ABORT, 'prune blocked'); END;",
    )
    .await
    .unwrap();

    let result = leaderboard::store_snapshot(
        &db,
        board.id,
        base + chrono::Duration::hours(3),
        &[entry(character_id, 1)],
        SNAPSHOTS_TO_KEEP,
    )
    .await;
    assert!(result.is_err());

    let remaining = leaderboard::entries_for_leaderboard(&db, board.id).await.unwrap();
    assert_eq!(remaining.len(), SNAPSHOTS_TO_KEEP, "insert rolled back");
    assert!(remaining.iter().all(|e| e.snapshot_at < base + chrono::Duration::hours(3)));

    let after = leaderboard::find_or_create_leaderboard(&db, season.id, "3v3", "us")
        .await
        .unwrap();
    assert_eq!(after.last_synced_at, synced, "synced stamp rolled back");
}

#[tokio::test]
async fn catalog_upserts_return_stable_ids() {
    let db = setup_test_db().await;

    let item = ItemRecord {
        blizzard_id: 212065,
        inventory_type: Some("head".into()),
        item_class: Some("armor".into()),
        item_subclass: Some("cloth".into()),
        quality: Some("epic".into()),
        blizzard_media_id: Some(212065),
    };
    let first = catalog::upsert_items(&db, std::slice::from_ref(&item)).await.unwrap();
    let second = catalog::upsert_items(&db, &[item]).await.unwrap();
    assert_eq!(first, second);

    let talents = catalog::upsert_talents(
        &db,
        &[
            TalentRecord { blizzard_id: 5488, talent_type: TalentType::Pvp, spell_id: Some(352278) },
            TalentRecord { blizzard_id: 5488, talent_type: TalentType::Class, spell_id: None },
        ],
    )
    .await
    .unwrap();
    assert_eq!(talents.len(), 2, "talent identity includes its tree");

    let item_id = first[&212065];
    for value in ["Helm", "Helm of Storms"] {
        catalog::upsert_translations(
            &db,
            owner::ITEM,
            &[TranslationRecord {
                translatable_id: item_id,
                key: "name".into(),
                locale: "en_US".into(),
                value: value.into(),
            }],
        )
        .await
        .unwrap();
    }
    let name = catalog::find_translation(&db, owner::ITEM, item_id, "name", "en_US")
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("Helm of Storms"));

    let missing = catalog::items_missing_meta(&db, None, None).await.unwrap();
    assert_eq!(missing.len(), 1);
    catalog::mark_item_meta_synced(&db, item_id, Some("https://render.example/icon.jpg".into()))
        .await
        .unwrap();
    assert!(catalog::items_missing_meta(&db, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn character_gear_is_replaced_wholesale() {
    let db = setup_test_db().await;
    let characters = character_repo::upsert_seeds(&db, "us", &[seed(1001, "Zed")]).await.unwrap();
    let character_id = characters[&1001];
    let items = catalog::upsert_items(
        &db,
        &[
            ItemRecord { blizzard_id: 1, ..Default::default() },
            ItemRecord { blizzard_id: 2, ..Default::default() },
        ],
    )
    .await
    .unwrap();

    let gear = |slot: &str, item: i64| CharacterItemRecord {
        slot: slot.to_string(),
        item_id: items[&item],
        item_level: 636,
        enchantment_id: None,
        sockets: json!([{"type": "PRISMATIC", "item_id": 213746}]),
        bonus_list: json!([]),
    };

    catalog::replace_character_items(&db, character_id, &[gear("HEAD", 1), gear("NECK", 2)])
        .await
        .unwrap();
    catalog::replace_character_items(&db, character_id, &[gear("HEAD", 2)])
        .await
        .unwrap();

    let stored = catalog::character_items(&db, character_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].item_id, items[&2]);
    assert_eq!(stored[0].socket_list()[0].item_id, Some(213746));
}

#[tokio::test]
async fn unavailable_characters_wait_out_the_cooldown() {
    let db = setup_test_db().await;
    let ids = character_repo::upsert_seeds(&db, "us", &[seed(1001, "Zed"), seed(1002, "Ayla")])
        .await
        .unwrap();
    let (zed, ayla) = (ids[&1001], ids[&1002]);

    let until = Utc::now().fixed_offset() + chrono::Duration::weeks(2);
    character_repo::mark_unavailable(&db, zed, until).await.unwrap();
    character_repo::mark_private(&db, ayla).await.unwrap();

    let candidates = character_repo::find_sync_candidates(&db, &[zed, ayla]).await.unwrap();
    assert!(candidates.is_empty());
    let stale = character_repo::find_meta_stale(&db, &[zed, ayla], Utc::now().fixed_offset())
        .await
        .unwrap();
    assert!(stale.is_empty(), "no meta fetches during the cooldown");

    let past = Utc::now().fixed_offset() - chrono::Duration::minutes(1);
    character_repo::mark_unavailable(&db, zed, past).await.unwrap();
    let candidates = character_repo::find_sync_candidates(&db, &[zed, ayla]).await.unwrap();
    assert_eq!(candidates.iter().map(|c| c.id).collect::<Vec<_>>(), vec![zed]);

    let stale = character_repo::find_meta_stale(&db, &[zed, ayla], Utc::now().fixed_offset())
        .await
        .unwrap();
    assert_eq!(stale, vec![zed], "private characters never need meta");
}

#[tokio::test]
async fn sync_cycle_progresses_and_terminal_states_stick() {
    let db = setup_test_db().await;
    let season = leaderboard::upsert_season(&db, 40, "Season 2").await.unwrap();
    let regions = vec!["us".to_string(), "eu".to_string()];
    let cycle = sync_cycle::create(&db, season.id, &regions, Utc::now().fixed_offset())
        .await
        .unwrap();
    assert_eq!(cycle.status, SyncCycleStatus::SyncingLeaderboards);
    assert_eq!(cycle.regions, json!(["us", "eu"]));

    sync_cycle::add_expected_batches(&db, cycle.id, 3).await.unwrap();
    sync_cycle::add_expected_batches(&db, cycle.id, 2).await.unwrap();
    sync_cycle::increment_completed_batches(&db, cycle.id).await.unwrap();
    sync_cycle::complete(&db, cycle.id).await.unwrap();
    sync_cycle::fail(&db, cycle.id).await.unwrap();

    let stored = sync_cycle::find_by_id(&db, cycle.id).await.unwrap().unwrap();
    assert_eq!(stored.expected_character_batches, 5);
    assert_eq!(stored.completed_character_batches, 1);
    assert_eq!(stored.status, SyncCycleStatus::Completed);
    assert!(stored.completed_at.is_some());

    let err = sync_cycle::set_status(&db, 9999, SyncCycleStatus::Aggregating)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn popularity_replacement_and_paging() {
    let db = setup_test_db().await;
    let season = leaderboard::upsert_season(&db, 40, "Season 2").await.unwrap();
    let now = Utc::now().fixed_offset();

    let row = |slot: &str, item_id: i64, usage_count: i32| item_popularity::ActiveModel {
        pvp_season_id: Set(season.id),
        bracket: Set("3v3".into()),
        spec_id: Set(62),
        slot: Set(slot.into()),
        item_id: Set(item_id),
        usage_count: Set(usage_count),
        usage_pct: Set(f64::from(usage_count) * 10.0),
        snapshot_at: Set(now),
        ..Default::default()
    };

    popularity::replace_item_popularity(&db, season.id, vec![row("HEAD", 1, 1)])
        .await
        .unwrap();
    let written = popularity::replace_item_popularity(
        &db,
        season.id,
        vec![row("HEAD", 2, 3), row("HEAD", 3, 3), row("HEAD", 4, 4), row("NECK", 5, 10)],
    )
    .await
    .unwrap();
    assert_eq!(written, 4);
    assert_eq!(popularity::count_items(&db, season.id).await.unwrap(), 4);

    let head = popularity::list_items(
        &db,
        &PopularityFilter::season(season.id).slot("head"),
        &Pagination::new(0, 2),
    )
    .await
    .unwrap();
    assert_eq!(head.total, 3);
    assert_eq!(head.total_pages, 2);
    assert_eq!(head.items.iter().map(|r| r.item_id).collect::<Vec<_>>(), vec![4, 2]);

    let second_page = popularity::list_items(
        &db,
        &PopularityFilter::season(season.id).slot("HEAD"),
        &Pagination::new(1, 2),
    )
    .await
    .unwrap();
    assert_eq!(second_page.items.iter().map(|r| r.item_id).collect::<Vec<_>>(), vec![3]);

    let other = popularity::list_items(
        &db,
        &PopularityFilter::season(season.id).bracket("2v2"),
        &Pagination::default(),
    )
    .await
    .unwrap();
    assert_eq!(other.total, 0);

    tokio::time::timeout(Duration::from_secs(5), async {
        popularity::replace_item_popularity(&db, season.id, Vec::new()).await
    })
    .await
    .expect("replacement timed out")
    .unwrap();
    assert_eq!(popularity::count_items(&db, season.id).await.unwrap(), 0);
}
