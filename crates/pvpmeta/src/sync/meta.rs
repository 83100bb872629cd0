//! Character profile/media and item icon refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::blizzard::ApiError;
use crate::blizzard::types::MediaDocument;
use crate::entity::character;
use crate::repository::catalog;
use crate::repository::character::{self as character_repo, CharacterMeta};

use super::context::SyncContext;
use super::errors::Result;
use super::executor::run_bounded_shared;

/// Asset key of an item's icon in its media document.
pub const ITEM_ICON_ASSET: &str = "icon";

/// Tally of an item icon pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemMetaCounts {
    /// Icons stored.
    pub synced: usize,
    /// Items upstream has no media for.
    pub missing: usize,
    /// Fetches that failed; the rows are retried next time.
    pub failed: usize,
}

/// Refresh profile and media of `character_ids`. Returns how many were stored.
///
/// A character whose profile is gone upstream is marked private and never
/// fetched again.
pub async fn sync_character_meta(ctx: &SyncContext, character_ids: &[i64]) -> Result<usize> {
    let characters = character_repo::find_by_ids(ctx.db(), character_ids).await?;
    let synced = Arc::new(AtomicUsize::new(0));

    let options = ctx.options();
    run_bounded_shared(
        characters,
        options.meta_concurrency,
        options.pool_limit,
        ctx.pool_permits(),
        |character| {
            let ctx = ctx.clone();
            let synced = Arc::clone(&synced);
            async move {
                match sync_one_character(&ctx, &character).await {
                    Ok(true) => {
                        synced.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(false) => {}
                    Err(e) => tracing::warn!(
                        character_id = character.id,
                        character = %character.display_name(),
                        error = %e,
                        "Character meta sync failed"
                    ),
                }
                Some(())
            }
        },
    )
    .await;

    Ok(synced.load(Ordering::Relaxed))
}

/// `Ok(false)` when the character turned out to be private.
async fn sync_one_character(ctx: &SyncContext, character: &character::Model) -> Result<bool> {
    if character.is_private {
        return Ok(false);
    }
    let client = ctx.client(&character.region)?;
    let (profile, media) = tokio::join!(
        client.character_profile(&character.realm, &character.name),
        client.character_media(&character.realm, &character.name),
    );

    let profile = match profile {
        Ok(profile) => profile,
        Err(e) if e.is_not_found() => {
            character_repo::mark_private(ctx.db(), character.id).await?;
            tracing::debug!(character_id = character.id, "Character profile hidden, marked private");
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };
    let media = media_or_empty(media)?;

    let meta = CharacterMeta {
        race: profile.race.name.clone(),
        race_id: profile.race.id.and_then(|id| i32::try_from(id).ok()),
        class_id: profile.character_class.id.and_then(|id| i32::try_from(id).ok()),
        avatar_url: media.asset("avatar").map(str::to_string),
        inset_url: media.asset("inset").map(str::to_string),
        main_raw_url: media.asset("main-raw").map(str::to_string),
    };
    character_repo::update_meta(ctx.db(), character.id, meta).await?;
    Ok(true)
}

/// A missing media document is treated as one without assets.
fn media_or_empty(result: std::result::Result<MediaDocument, ApiError>) -> Result<MediaDocument> {
    match result {
        Ok(doc) => Ok(doc),
        Err(e) if e.is_not_found() => Ok(MediaDocument::default()),
        Err(e) => Err(e.into()),
    }
}

/// Fetch icons for items that never had their media synced.
///
/// `item_ids` restricts the pass to those internal ids; `None` covers every
/// item still missing metadata.
pub async fn sync_item_meta(ctx: &SyncContext, item_ids: Option<&[i64]>) -> Result<ItemMetaCounts> {
    let items = catalog::items_missing_meta(ctx.db(), item_ids, None).await?;
    if items.is_empty() {
        return Ok(ItemMetaCounts::default());
    }
    let Some(client) = ctx.any_client() else {
        tracing::warn!(count = items.len(), "No API client configured, item icons skipped");
        return Ok(ItemMetaCounts {
            failed: items.len(),
            ..Default::default()
        });
    };
    let client = client.clone();

    tracing::info!(count = items.len(), "Syncing item icons");

    let options = ctx.options();
    let permits = ctx.pool_permits();
    let results = run_bounded_shared(items, options.meta_concurrency, options.pool_limit, permits, |item| {
        let client = client.clone();
        let ctx = ctx.clone();
        async move {
            let lookup_id = item.blizzard_media_id.unwrap_or(item.blizzard_id);
            let outcome = match client.item_media(lookup_id).await {
                Ok(doc) => {
                    let icon = doc.asset(ITEM_ICON_ASSET).map(str::to_string);
                    let found = icon.is_some();
                    catalog::mark_item_meta_synced(ctx.db(), item.id, icon)
                        .await
                        .map(|_| if found { MetaResult::Synced } else { MetaResult::Missing })
                }
                Err(e) if e.is_not_found() => catalog::mark_item_meta_synced(ctx.db(), item.id, None)
                    .await
                    .map(|_| MetaResult::Missing),
                Err(e) => {
                    tracing::warn!(
                        item_id = item.blizzard_id,
                        error = %crate::blizzard::short_error_message(&e),
                        "Item media fetch failed"
                    );
                    return Some(MetaResult::Failed);
                }
            };
            match outcome {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(item_id = item.blizzard_id, error = %e, "Item meta write failed");
                    Some(MetaResult::Failed)
                }
            }
        }
    })
    .await;

    let mut counts = ItemMetaCounts::default();
    for result in results {
        match result {
            MetaResult::Synced => counts.synced += 1,
            MetaResult::Missing => counts.missing += 1,
            MetaResult::Failed => counts.failed += 1,
        }
    }
    tracing::info!(
        synced = counts.synced,
        missing = counts.missing,
        failed = counts.failed,
        "Item icons synced"
    );
    Ok(counts)
}

#[derive(Debug, Clone, Copy)]
enum MetaResult {
    Synced,
    Missing,
    Failed,
}
