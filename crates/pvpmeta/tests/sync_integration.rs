//! Integration tests for the sync pipeline.
//!
//! These tests require the `sqlite` and `migrate` features to be enabled.
//! They run against an in-memory SQLite database and a mock HTTP transport.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pvpmeta::blizzard::{
    BlizzardClient, ClientOptions, ResourceKind, StaticToken, character_path,
};
use pvpmeta::connect_and_migrate;
use pvpmeta::entity::character;
use pvpmeta::entity::sync_cycle_status::SyncCycleStatus;
use pvpmeta::http::{HttpResponse, HttpTransport, MockTransport};
use pvpmeta::policy::{SyncTtls, region_policy_for};
use pvpmeta::repository::{
    Pagination, PopularityFilter, catalog, character as character_repo, leaderboard,
    popularity, sync_cycle,
};
use pvpmeta::retry::RetryConfig;
use pvpmeta::sync::{
    OutcomeStatus, SyncContext, SyncError, SyncOptions, run_cycle, sync_character,
    sync_character_batch,
};
use sea_orm::{ActiveValue::Set, DatabaseConnection};
use serde_json::{Value, json};

const SEASON: i64 = 40;
const LAST_MODIFIED: &str = "Wed, 04 Feb 2026 03:31:52 GMT";

async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

async fn with_timeout<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(30), fut)
        .await
        .expect("test timed out")
}

fn us_client(transport: &Arc<MockTransport>) -> BlizzardClient {
    region_client("us", transport)
}

fn region_client(region: &str, transport: &Arc<MockTransport>) -> BlizzardClient {
    let options = ClientOptions {
        retry: RetryConfig::new(Duration::from_millis(1), Duration::from_millis(2), 1),
        ..Default::default()
    };
    let locale = region_policy_for(region).map(|p| p.locale).unwrap_or("en_US");
    BlizzardClient::new_with_transport(
        region,
        locale,
        Arc::new(StaticToken::new("test-token")),
        options,
        Arc::clone(transport) as Arc<dyn HttpTransport>,
    )
    .expect("valid client")
}

fn options() -> SyncOptions {
    SyncOptions {
        regions: vec!["us".to_string()],
        pool_limit: 1,
        ..Default::default()
    }
}

fn context(db: DatabaseConnection, transport: &Arc<MockTransport>, options: SyncOptions) -> SyncContext {
    SyncContext::builder()
        .database(Arc::new(db))
        .client(us_client(transport))
        .options(options)
        .build()
        .expect("valid context")
}

fn profile_url(client: &BlizzardClient, name: &str, suffix: &str) -> String {
    client.url(ResourceKind::Profile, &character_path("area-52", name, suffix))
}

fn with_last_modified(body: Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: vec![("Last-Modified".to_string(), LAST_MODIFIED.to_string())],
        body: body.to_string().into_bytes(),
    }
}

fn equipment_body(head_item: i64, enchant: Option<i64>) -> Value {
    let enchantments = match enchant {
        Some(id) => json!([{
            "enchantment_id": id,
            "display_string": "Enchanted: +315 Haste",
            "enchantment_slot": {"id": 0, "type": "PERMANENT"}
        }]),
        None => json!([]),
    };
    json!({
        "equipped_items": [
            {
                "item": {"id": head_item},
                "slot": {"type": "HEAD", "name": "Head"},
                "name": format!("Helm {}", head_item),
                "quality": {"type": "EPIC"},
                "inventory_type": {"type": "HEAD"},
                "item_class": {"name": "Armor"},
                "item_subclass": {"name": "Cloth"},
                "media": {"id": head_item},
                "level": {"value": 636},
                "bonus_list": [10390],
                "enchantments": enchantments,
                "sockets": [{"socket_type": {"type": "PRISMATIC"}, "item": {"id": 213746}}]
            },
            {
                "item": {"id": 5976},
                "slot": {"type": "TABARD", "name": "Tabard"},
                "level": {"value": 1}
            }
        ]
    })
}

fn specializations_body() -> Value {
    json!({
        "active_specialization": {"id": 62, "name": "Arcane"},
        "active_hero_talent_tree": {"id": 39, "name": "Sunfury"},
        "specializations": [{
            "specialization": {"id": 62, "name": "Arcane"},
            "pvp_talent_slots": [
                {"selected": {"talent": {"id": 5488, "name": "Ice Wall"}, "spell_tooltip": {"spell": {"id": 352278}}}}
            ],
            "loadouts": [{
                "is_active": true,
                "talent_loadout_code": "C4DAAAAAAAAAAAAAAAAAAAAAAAA",
                "selected_class_talent_tree": {"name": "Mage"},
                "selected_class_talents": [
                    {"id": 1, "rank": 1, "tooltip": {"talent": {"id": 62086, "name": "Blink"}}}
                ],
                "selected_spec_talents": [
                    {"id": 2, "rank": 1, "tooltip": {"talent": {"id": 62127, "name": "Arcane Surge"}}}
                ],
                "selected_hero_talents": []
            }]
        }]
    })
}

fn leaderboard_body(characters: &[(i64, &str, i32)]) -> Value {
    let entries: Vec<Value> = characters
        .iter()
        .enumerate()
        .map(|(i, (id, name, rating))| {
            json!({
                "character": {"id": id, "name": name, "realm": {"slug": "area-52"}},
                "faction": {"type": "ALLIANCE"},
                "rank": i + 1,
                "rating": rating,
                "season_match_statistics": {"played": 20, "won": 15, "lost": 5}
            })
        })
        .collect();
    json!({ "entries": entries })
}

type ItemRow = (String, i32, String, i64, i32, f64);
type GemRow = (String, i32, String, String, i64, i32, f64);

/// Popularity tables without ids or snapshot stamps, in listing order.
#[derive(Debug, PartialEq)]
struct PopularityRows {
    items: Vec<ItemRow>,
    enchants: Vec<ItemRow>,
    gems: Vec<GemRow>,
}

async fn popularity_rows(db: &DatabaseConnection, season_id: i64) -> PopularityRows {
    let filter = PopularityFilter::season(season_id);
    let page = Pagination::new(0, 1000);

    let items = popularity::list_items(db, &filter, &page).await.unwrap().items;
    let enchants = popularity::list_enchants(db, &filter, &page).await.unwrap().items;
    let gems = popularity::list_gems(db, &filter, &page).await.unwrap().items;

    PopularityRows {
        items: items
            .into_iter()
            .map(|r| (r.bracket, r.spec_id, r.slot, r.item_id, r.usage_count, r.usage_pct))
            .collect(),
        enchants: enchants
            .into_iter()
            .map(|r| (r.bracket, r.spec_id, r.slot, r.enchantment_id, r.usage_count, r.usage_pct))
            .collect(),
        gems: gems
            .into_iter()
            .map(|r| {
                (r.bracket, r.spec_id, r.slot, r.socket_type, r.item_id, r.usage_count, r.usage_pct)
            })
            .collect(),
    }
}

/// Season + one 3v3 leaderboard with the given characters stored.
async fn seed_leaderboard(
    ctx: &SyncContext,
    transport: &Arc<MockTransport>,
    characters: &[(i64, &str, i32)],
) -> pvpmeta::entity::pvp_season::Model {
    let season = leaderboard::upsert_season(ctx.db(), SEASON, "The War Within Season 2")
        .await
        .unwrap();
    leaderboard::set_current_season(ctx.db(), season.id).await.unwrap();

    let client = ctx.client("us").unwrap();
    transport.push_json(
        client.url(
            ResourceKind::Dynamic,
            &format!("/data/wow/pvp-season/{}/pvp-leaderboard/3v3", SEASON),
        ),
        leaderboard_body(characters),
    );
    pvpmeta::sync::sync_leaderboard(ctx, "us", &season, "3v3", chrono::Utc::now().fixed_offset())
        .await
        .unwrap();
    season
}

#[tokio::test]
async fn full_cycle_syncs_enriches_and_aggregates() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ctx = context(db, &transport, options());
        let client = us_client(&transport);

        let season = leaderboard::upsert_season(ctx.db(), SEASON, "The War Within Season 2")
            .await
            .unwrap();
        leaderboard::set_current_season(ctx.db(), season.id).await.unwrap();

        transport.push_json(
            client.url(
                ResourceKind::Dynamic,
                &format!("/data/wow/pvp-season/{}/pvp-leaderboard/index", SEASON),
            ),
            json!({"leaderboards": [{"name": "3v3"}, {"name": "rbg"}]}),
        );
        transport.push_json(
            client.url(
                ResourceKind::Dynamic,
                &format!("/data/wow/pvp-season/{}/pvp-leaderboard/3v3", SEASON),
            ),
            leaderboard_body(&[(1001, "Zed", 2600), (1002, "Ayla", 2500), (1003, "Low", 1500)]),
        );
        for (name, helm) in [("zed", 212065), ("ayla", 212066)] {
            transport.push_json(
                profile_url(&client, name, ""),
                json!({"race": {"id": 1, "name": "Human"}, "character_class": {"id": 8, "name": "Mage"}}),
            );
            transport.push_json(
                profile_url(&client, name, "/character-media"),
                json!({"assets": [{"key": "avatar", "value": "https://render.example/avatar.jpg"}]}),
            );
            transport.push_response(
                profile_url(&client, name, "/equipment"),
                with_last_modified(equipment_body(helm, Some(7340))),
            );
            transport.push_response(
                profile_url(&client, name, "/specializations"),
                with_last_modified(specializations_body()),
            );
        }
        for media in [212065, 212066] {
            transport.push_json(
                client.url(ResourceKind::Static, &format!("/data/wow/media/item/{}", media)),
                json!({"assets": [{"key": "icon", "value": format!("https://render.example/{}.jpg", media)}]}),
            );
        }

        let report = run_cycle(&ctx).await.unwrap();

        assert_eq!(report.regions.len(), 1);
        let us = &report.regions[0];
        assert_eq!(us.brackets, 1);
        assert_eq!(us.characters, 2, "the 1500-rated entry is below the 3v3 floor");
        assert_eq!(us.succeeded, 2);
        assert_eq!(us.failed, 0);
        assert_eq!(us.statuses.get("applied_fresh_snapshot"), Some(&2));
        assert_eq!(us.meta_synced, 2);
        assert_eq!(report.items_meta_synced, 2);

        let counts = report.aggregations.expect("aggregation ran");
        assert_eq!(counts.items, 2);
        assert_eq!(counts.enchants, 1);
        assert_eq!(counts.gems, 1);

        let cycle = sync_cycle::find_by_id(ctx.db(), report.cycle_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cycle.status, SyncCycleStatus::Completed);
        assert_eq!(cycle.expected_character_batches, 1);
        assert_eq!(cycle.completed_character_batches, 1);
        assert!(cycle.completed_at.is_some());

        let enchants = popularity::list_enchants(
            ctx.db(),
            &PopularityFilter::season(season.id).bracket("3v3").spec(62),
            &Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(enchants.total, 1);
        assert_eq!(enchants.items[0].enchantment_id, 7340);
        assert_eq!(enchants.items[0].usage_count, 2);
        assert_eq!(enchants.items[0].usage_pct, 100.0);

        let items = popularity::list_items(
            ctx.db(),
            &PopularityFilter::season(season.id).slot("head"),
            &Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(items.total, 2);
        assert!(items.items.iter().all(|row| row.usage_pct == 50.0));
        assert!(items.items[0].item_id < items.items[1].item_id);
    })
    .await;
}

#[tokio::test]
async fn fresh_snapshot_then_not_modified() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ttls = SyncTtls {
            equipment: chrono::Duration::zero(),
            ..Default::default()
        };
        let ctx = context(db, &transport, SyncOptions { ttls, ..options() });
        let client = us_client(&transport);
        seed_leaderboard(&ctx, &transport, &[(1001, "Zed", 2600)]).await;

        transport.push_response(
            profile_url(&client, "zed", "/equipment"),
            with_last_modified(equipment_body(212065, None)),
        );
        transport.push_response(
            profile_url(&client, "zed", "/specializations"),
            with_last_modified(specializations_body()),
        );
        transport.push_status(profile_url(&client, "zed", "/equipment"), 304);
        transport.push_status(profile_url(&client, "zed", "/specializations"), 304);

        let character = character_repo::find_sync_candidates(ctx.db(), &[1]).await.unwrap();
        assert_eq!(character.len(), 1);
        let status = sync_character(&ctx, &character[0], "en_US").await.unwrap();
        assert_eq!(status, OutcomeStatus::AppliedFreshSnapshot);

        let stored = character_repo::get(ctx.db(), character[0].id).await.unwrap();
        assert_eq!(stored.equipment_last_modified.as_deref(), Some(LAST_MODIFIED));
        assert_eq!(stored.class_slug.as_deref(), Some("mage"));
        assert!(stored.equipment_fingerprint.is_some());

        let entry = leaderboard::latest_processed_entry(ctx.db(), stored.id)
            .await
            .unwrap()
            .expect("entry processed");
        assert_eq!(entry.spec_id, Some(62));
        assert_eq!(entry.item_level, Some(636));
        assert_eq!(entry.hero_talent_tree_name.as_deref(), Some("sunfury"));
        assert_eq!(entry.raw_equipment, Some(equipment_body(212065, None)));
        assert_eq!(entry.raw_specialization, Some(specializations_body()));

        let gear = catalog::character_items(ctx.db(), stored.id).await.unwrap();
        assert_eq!(gear.len(), 1, "tabard is never stored");
        assert_eq!(gear[0].slot, "HEAD");

        let status = sync_character(&ctx, &stored, "en_US").await.unwrap();
        assert_eq!(status, OutcomeStatus::NotModified);

        let after = character_repo::get(ctx.db(), stored.id).await.unwrap();
        assert_eq!(after.updated_at, stored.updated_at, "304 must not write");

        let sent = transport.requests();
        let conditional = sent
            .iter()
            .filter(|r| r.url.contains("/equipment"))
            .last()
            .unwrap();
        assert!(
            conditional
                .headers
                .iter()
                .any(|(k, v)| k == "If-Modified-Since" && v == LAST_MODIFIED)
        );
    })
    .await;
}

#[tokio::test]
async fn recent_snapshot_is_reused() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ctx = context(db, &transport, options());
        let client = us_client(&transport);
        seed_leaderboard(&ctx, &transport, &[(1001, "Zed", 2600)]).await;

        transport.push_response(
            profile_url(&client, "zed", "/equipment"),
            with_last_modified(equipment_body(212065, None)),
        );
        transport.push_response(
            profile_url(&client, "zed", "/specializations"),
            with_last_modified(specializations_body()),
        );

        let candidates = character_repo::find_sync_candidates(ctx.db(), &[1]).await.unwrap();
        let first = sync_character(&ctx, &candidates[0], "en_US").await.unwrap();
        assert_eq!(first, OutcomeStatus::AppliedFreshSnapshot);

        let refreshed = character_repo::get(ctx.db(), 1).await.unwrap();
        let requests_before = transport.requests().len();
        let second = sync_character(&ctx, &refreshed, "en_US").await.unwrap();
        assert_eq!(second, OutcomeStatus::ReusedSnapshot);
        assert_eq!(transport.requests().len(), requests_before, "no upstream call");
    })
    .await;
}

#[tokio::test]
async fn missing_equipment_puts_character_on_cooldown() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ctx = context(db, &transport, options());
        let client = us_client(&transport);
        seed_leaderboard(&ctx, &transport, &[(1001, "Zed", 2600)]).await;

        transport.push_status(profile_url(&client, "zed", "/equipment"), 404);
        transport.push_response(
            profile_url(&client, "zed", "/specializations"),
            with_last_modified(specializations_body()),
        );

        let outcome = sync_character_batch(&ctx, &[1], "en_US", "us batch 1/1")
            .await
            .unwrap();
        assert_eq!(outcome.success_count(), 1);
        assert_eq!(
            outcome.counts_by_status(),
            vec![(OutcomeStatus::EquipmentUnavailable, 1)]
        );

        let stored = character_repo::get(ctx.db(), 1).await.unwrap();
        assert!(stored.unavailable_until.is_some());
        assert!(
            character_repo::find_sync_candidates(ctx.db(), &[1])
                .await
                .unwrap()
                .is_empty(),
            "character is skipped during the cooldown"
        );
    })
    .await;
}

#[tokio::test]
async fn batch_where_everything_fails_is_escalated() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ctx = context(db, &transport, options());
        let client = us_client(&transport);
        seed_leaderboard(&ctx, &transport, &[(1001, "Zed", 2600), (1002, "Ayla", 2500)]).await;

        for name in ["zed", "ayla"] {
            transport.push_status(profile_url(&client, name, "/equipment"), 503);
            transport.push_status(profile_url(&client, name, "/specializations"), 503);
        }

        let err = sync_character_batch(&ctx, &[1, 2], "en_US", "us batch 1/1")
            .await
            .unwrap_err();
        match err {
            SyncError::TotalBatchFailure(message) => {
                assert!(message.starts_with("[us batch 1/1] All 2 items failed"), "{message}");
                assert!(message.contains("api_error"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    })
    .await;
}

#[tokio::test]
async fn cycle_without_current_season_fails_fast() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ctx = context(db, &transport, options());

        let err = run_cycle(&ctx).await.unwrap_err();
        assert!(matches!(err, SyncError::NoCurrentSeason));
        assert!(sync_cycle::latest(ctx.db()).await.unwrap().is_none());
        assert!(transport.requests().is_empty());
    })
    .await;
}

#[tokio::test]
async fn aggregation_is_idempotent() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ctx = context(db, &transport, options());
        let client = us_client(&transport);
        let season =
            seed_leaderboard(&ctx, &transport, &[(1001, "Zed", 2600), (1002, "Ayla", 2500)]).await;

        for (name, helm) in [("zed", 212065), ("ayla", 212065)] {
            transport.push_response(
                profile_url(&client, name, "/equipment"),
                with_last_modified(equipment_body(helm, Some(7340))),
            );
            transport.push_response(
                profile_url(&client, name, "/specializations"),
                with_last_modified(specializations_body()),
            );
        }
        sync_character_batch(&ctx, &[1, 2], "en_US", "us batch 1/1")
            .await
            .unwrap();

        let first = pvpmeta::run_aggregations(ctx.db(), season.id, 1000).await.unwrap();
        let first_rows = popularity_rows(ctx.db(), season.id).await;
        let second = pvpmeta::run_aggregations(ctx.db(), season.id, 1000).await.unwrap();
        let second_rows = popularity_rows(ctx.db(), season.id).await;
        assert_eq!(first, second);
        assert_eq!(first_rows, second_rows);
        assert_eq!(
            first_rows.items,
            vec![("3v3".to_string(), 62, "HEAD".to_string(), first_rows.items[0].3, 2, 100.0)]
        );
        assert_eq!(first_rows.enchants.len(), 1);
        assert_eq!(first_rows.enchants[0].3, 7340);
        assert_eq!(popularity::count_items(ctx.db(), season.id).await.unwrap(), 1);

        let gems = popularity::list_gems(
            ctx.db(),
            &PopularityFilter::season(season.id),
            &Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(gems.total, 1);
        assert_eq!(gems.items[0].socket_type, "PRISMATIC");
        assert_eq!(gems.items[0].item_id, 213746);
        assert_eq!(gems.items[0].usage_count, 2);

        let top_one = pvpmeta::run_aggregations(ctx.db(), season.id, 1).await.unwrap();
        assert_eq!(top_one.items, 1);
        let items = popularity::list_items(
            ctx.db(),
            &PopularityFilter::season(season.id),
            &Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(items.items[0].usage_count, 1, "only the top character counts");
    })
    .await;
}

#[tokio::test]
async fn regions_run_as_concurrent_lanes() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let us = region_client("us", &transport);
        let eu = region_client("eu", &transport);
        let ctx = SyncContext::builder()
            .database(Arc::new(db))
            .client(us.clone())
            .client(eu.clone())
            .options(SyncOptions {
                regions: vec!["us".to_string(), "eu".to_string()],
                pool_limit: 4,
                sync_item_meta: false,
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(ctx.pool_permits().available_permits(), 2);

        let season = leaderboard::upsert_season(ctx.db(), SEASON, "The War Within Season 2")
            .await
            .unwrap();
        leaderboard::set_current_season(ctx.db(), season.id).await.unwrap();

        for (client, name, id) in [(&us, "Zed", 1001), (&eu, "Ayla", 2001)] {
            transport.push_json(
                client.url(
                    ResourceKind::Dynamic,
                    &format!("/data/wow/pvp-season/{}/pvp-leaderboard/index", SEASON),
                ),
                json!({"leaderboards": [{"name": "3v3"}]}),
            );
            transport.push_json(
                client.url(
                    ResourceKind::Dynamic,
                    &format!("/data/wow/pvp-season/{}/pvp-leaderboard/3v3", SEASON),
                ),
                leaderboard_body(&[(id, name, 2600)]),
            );
            let lower = name.to_lowercase();
            transport.push_response(
                profile_url(client, &lower, "/equipment"),
                with_last_modified(equipment_body(212065, Some(7340))),
            );
            transport.push_response(
                profile_url(client, &lower, "/specializations"),
                with_last_modified(specializations_body()),
            );
        }

        let report = run_cycle(&ctx).await.unwrap();

        let regions: Vec<&str> = report.regions.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, vec!["us", "eu"]);
        for region in &report.regions {
            assert_eq!(region.characters, 1, "{}", region.region);
            assert_eq!(region.succeeded, 1, "{}", region.region);
            assert_eq!(region.failed, 0, "{}", region.region);
        }
        assert_eq!(ctx.pool_permits().available_permits(), 2, "every permit returned");

        let cycle = sync_cycle::find_by_id(ctx.db(), report.cycle_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cycle.status, SyncCycleStatus::Completed);
        assert_eq!(cycle.expected_character_batches, 2);
        assert_eq!(cycle.completed_character_batches, 2);

        let items = popularity::list_items(
            ctx.db(),
            &PopularityFilter::season(season.id),
            &Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(items.total, 1);
        assert_eq!(items.items[0].usage_count, 2, "both regions are counted");
    })
    .await;
}

#[tokio::test]
async fn unavailable_characters_are_never_failures() {
    with_timeout(async {
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ctx = context(db, &transport, options());
        let client = us_client(&transport);
        seed_leaderboard(
            &ctx,
            &transport,
            &[(1001, "Zed", 2600), (1002, "Ayla", 2500), (1003, "Kai", 2400)],
        )
        .await;

        transport.push_status(profile_url(&client, "zed", "/equipment"), 404);
        transport.push_response(
            profile_url(&client, "zed", "/specializations"),
            with_last_modified(specializations_body()),
        );
        transport.push_status(profile_url(&client, "ayla", "/equipment"), 503);
        transport.push_status(profile_url(&client, "ayla", "/specializations"), 503);
        transport.push_response(
            profile_url(&client, "kai", "/equipment"),
            with_last_modified(equipment_body(212065, None)),
        );
        transport.push_status(profile_url(&client, "kai", "/specializations"), 404);

        let candidates = character_repo::find_sync_candidates(ctx.db(), &[1, 2, 3])
            .await
            .unwrap();
        let id_of = |name: &str| {
            candidates
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.id)
                .unwrap()
        };

        let outcome = sync_character_batch(&ctx, &[1, 2, 3], "en_US", "us batch 1/1")
            .await
            .unwrap();

        let failures = outcome.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, id_of("ayla"));
        assert_eq!(outcome.success_count(), 2);

        let mut successes: Vec<(i64, OutcomeStatus)> = outcome
            .successes()
            .into_iter()
            .map(|s| (s.id, s.status))
            .collect();
        successes.sort_by_key(|(id, _)| *id);
        assert_eq!(
            successes,
            vec![
                (id_of("zed"), OutcomeStatus::EquipmentUnavailable),
                (id_of("kai"), OutcomeStatus::TalentsUnavailable),
            ]
        );
    })
    .await;
}

#[tokio::test]
async fn failed_fetch_keeps_stored_validators() {
    with_timeout(async {
        const STALE: &str = "Mon, 01 Jan 2024 00:00:00 GMT";
        let db = setup_test_db().await;
        let transport = Arc::new(MockTransport::new());
        let ctx = context(db, &transport, options());
        let client = us_client(&transport);
        seed_leaderboard(&ctx, &transport, &[(1001, "Zed", 2600)]).await;

        character_repo::update_columns(
            ctx.db(),
            1,
            character::ActiveModel {
                equipment_last_modified: Set(Some(STALE.to_string())),
                talents_last_modified: Set(Some(STALE.to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        transport.push_status(profile_url(&client, "zed", "/equipment"), 503);
        transport.push_status(profile_url(&client, "zed", "/specializations"), 503);

        let character = character_repo::get(ctx.db(), 1).await.unwrap();
        assert!(sync_character(&ctx, &character, "en_US").await.is_err());

        let after = character_repo::get(ctx.db(), 1).await.unwrap();
        assert_eq!(after.equipment_last_modified.as_deref(), Some(STALE));
        assert_eq!(after.talents_last_modified.as_deref(), Some(STALE));

        transport.push_response(
            profile_url(&client, "zed", "/equipment"),
            with_last_modified(equipment_body(212065, None)),
        );
        transport.push_response(
            profile_url(&client, "zed", "/specializations"),
            with_last_modified(specializations_body()),
        );
        let status = sync_character(&ctx, &after, "en_US").await.unwrap();
        assert_eq!(status, OutcomeStatus::AppliedFreshSnapshot);

        let sent = transport.requests();
        assert!(
            sent.iter()
                .all(|r| r.headers.iter().all(|(k, _)| k != "If-Modified-Since")),
            "no processed entry, so fetches are unconditional"
        );
        let stored = character_repo::get(ctx.db(), 1).await.unwrap();
        assert_eq!(stored.equipment_last_modified.as_deref(), Some(LAST_MODIFIED));
    })
    .await;
}
