//! Per-character equipment and specialization sync.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{ActiveValue::Set, TransactionTrait};

use crate::blizzard::Conditional;
use crate::blizzard::types::{EquipmentSummary, SpecializationsSummary, WithRaw};
use crate::entity::character;
use crate::entity::pvp_leaderboard_entry;
use crate::entity::translation::owner;
use crate::repository::catalog::{
    self, CharacterItemRecord, ItemRecord, TalentRecord, TranslationRecord,
};
use crate::repository::character as character_repo;
use crate::repository::leaderboard::{
    self as leaderboard_repo, EquipmentAttrs, SpecializationAttrs,
};
use crate::repository::RepositoryError;

use super::context::SyncContext;
use super::errors::{Result, SyncError};
use super::executor::run_bounded_shared;
use super::extract::{EquipmentSnapshot, TalentLoadout, extract_equipment, extract_talents};
use super::logger;
use super::outcome::{BatchOutcome, OutcomeStatus};

/// Sync every available character of `character_ids` and record the results.
///
/// Private characters and characters in an unavailability cooldown are not
/// attempted. Per-character failures are recorded, never raised; the batch
/// only errors when every attempted character failed.
#[tracing::instrument(skip(ctx, character_ids), fields(count = character_ids.len()))]
pub async fn sync_character_batch(
    ctx: &SyncContext,
    character_ids: &[i64],
    locale: &str,
    label: &str,
) -> Result<BatchOutcome> {
    let outcome = BatchOutcome::new();
    let candidates = character_repo::find_sync_candidates(ctx.db(), character_ids).await?;

    let options = ctx.options();
    let permits = ctx.pool_permits();
    run_bounded_shared(candidates, options.concurrency, options.pool_limit, permits, |character| {
        let ctx = ctx.clone();
        let outcome = outcome.clone();
        let locale = locale.to_string();
        async move {
            match sync_character(&ctx, &character, &locale).await {
                Ok(status) => outcome.record_success(character.id, status),
                Err(e) => {
                    tracing::warn!(
                        character_id = character.id,
                        character = %character.display_name(),
                        error = %e,
                        "Character sync failed"
                    );
                    outcome.record_failure(character.id, e.outcome_status(), e.short_message());
                }
            }
            Some(())
        }
    })
    .await;

    tracing::info!("{}", outcome.summary_message(label));
    logger::batch_complete(&outcome);
    outcome.raise_if_total_failure(label)?;

    Ok(outcome)
}

/// Bring the latest leaderboard entry of each bracket of `character` up to date.
pub async fn sync_character(
    ctx: &SyncContext,
    character: &character::Model,
    locale: &str,
) -> Result<OutcomeStatus> {
    if character.is_private {
        return Ok(OutcomeStatus::SkippedPrivate);
    }

    let db = ctx.db();
    let ttls = ctx.options().ttls;
    let now = Utc::now().fixed_offset();

    let entries = leaderboard_repo::entries_for_character(db, character.id).await?;
    if entries.is_empty() {
        return Ok(OutcomeStatus::NoEntries);
    }
    let target_ids: Vec<i64> = leaderboard_repo::latest_per_bracket(&entries)
        .iter()
        .map(|e| e.entry.id)
        .collect();

    let processed = leaderboard_repo::latest_processed_entry(db, character.id).await?;

    if let Some(snapshot_at) = character.last_equipment_snapshot_at
        && snapshot_at > now - ttls.equipment
        && let Some(source) = &processed
    {
        leaderboard_repo::apply_entry_attrs(
            db,
            &target_ids,
            Some(&EquipmentAttrs::from_entry(source)),
            Some(&SpecializationAttrs::from_entry(source)),
        )
        .await?;
        return Ok(OutcomeStatus::ReusedSnapshot);
    }

    // Nothing to copy from on a 304: fetch in full, drop validators on apply.
    let clear_validators = processed.is_none() && character.has_validators();
    let (equipment_validator, talents_validator) = if clear_validators {
        (None, None)
    } else {
        (
            character.equipment_last_modified.clone(),
            character.talents_last_modified.clone(),
        )
    };

    let client = ctx.client(&character.region)?;
    let (equipment, specializations) = tokio::join!(
        client.character_equipment(
            &character.realm,
            &character.name,
            equipment_validator.as_deref()
        ),
        client.character_specializations(
            &character.realm,
            &character.name,
            talents_validator.as_deref()
        ),
    );

    let unavailable = match (&equipment, &specializations) {
        (Err(e), _) if e.is_not_found() => Some(OutcomeStatus::EquipmentUnavailable),
        (_, Err(e)) if e.is_not_found() => Some(OutcomeStatus::TalentsUnavailable),
        _ => None,
    };
    if let Some(status) = unavailable {
        character_repo::mark_unavailable(db, character.id, now + ttls.unavailable_cooldown)
            .await?;
        tracing::debug!(character_id = character.id, %status, "Character unavailable upstream");
        return Ok(status);
    }

    let equipment = equipment?;
    let specializations = specializations?;

    if !equipment.changed && !specializations.changed {
        return Ok(OutcomeStatus::NotModified);
    }

    let equipment_update = match equipment {
        Conditional {
            body: Some(body),
            validator,
            ..
        } => Some(prepare_equipment(ctx, character, body, locale, validator).await?),
        _ => None,
    };
    let talents_update = match specializations {
        Conditional {
            body: Some(body),
            validator,
            ..
        } => Some(prepare_talents(ctx, body, locale, validator).await?),
        _ => None,
    };

    apply_updates(
        ctx,
        character,
        &target_ids,
        processed.as_ref(),
        clear_validators,
        equipment_update,
        talents_update,
    )
    .await?;

    Ok(OutcomeStatus::AppliedFreshSnapshot)
}

/// Catalog writes done, entry and character writes pending.
struct EquipmentUpdate {
    attrs: EquipmentAttrs,
    /// `Some` when the fingerprint changed and gear must be rebuilt.
    rebuild: Option<(String, Vec<CharacterItemRecord>)>,
    validator: Option<String>,
}

struct TalentsUpdate {
    attrs: SpecializationAttrs,
    class_slug: Option<String>,
    validator: Option<String>,
}

async fn prepare_equipment(
    ctx: &SyncContext,
    character: &character::Model,
    body: WithRaw<EquipmentSummary>,
    locale: &str,
    validator: Option<String>,
) -> Result<EquipmentUpdate> {
    let snapshot = extract_equipment(&body.parsed);
    let now = Utc::now().fixed_offset();

    let rebuild = if character.equipment_fingerprint.as_deref() == Some(snapshot.fingerprint.as_str())
    {
        None
    } else {
        let records = upsert_equipment_catalog(ctx, &snapshot, locale).await?;
        Some((snapshot.fingerprint.clone(), records))
    };

    let tier = snapshot.tier_set.as_ref();
    let attrs = EquipmentAttrs {
        item_level: snapshot.item_level,
        tier_set_id: tier.and_then(|t| t.id),
        tier_set_name: tier.and_then(|t| t.name.clone()),
        tier_set_pieces: tier.map(|t| t.pieces),
        tier_4p_active: tier.map(|t| t.four_piece_active),
        raw_equipment: Some(body.raw),
        processed_at: Some(now),
    };

    Ok(EquipmentUpdate {
        attrs,
        rebuild,
        validator,
    })
}

/// Upsert items, enchantments and their names. Returns the gear rows to store.
async fn upsert_equipment_catalog(
    ctx: &SyncContext,
    snapshot: &EquipmentSnapshot,
    locale: &str,
) -> Result<Vec<CharacterItemRecord>> {
    let db = ctx.db();

    let item_records: Vec<ItemRecord> = snapshot
        .items
        .iter()
        .map(|i| ItemRecord {
            blizzard_id: i.item_id,
            inventory_type: i.inventory_type.clone(),
            item_class: i.item_class.clone(),
            item_subclass: i.item_subclass.clone(),
            quality: i.quality.clone(),
            blizzard_media_id: i.media_id,
        })
        .collect();
    let item_ids = catalog::upsert_items(db, &item_records).await?;

    let item_names: Vec<TranslationRecord> = snapshot
        .items
        .iter()
        .filter_map(|i| {
            Some(TranslationRecord {
                translatable_id: *item_ids.get(&i.item_id)?,
                key: "name".to_string(),
                locale: locale.to_string(),
                value: i.name.clone().filter(|n| !n.is_empty())?,
            })
        })
        .collect();
    catalog::upsert_translations(db, owner::ITEM, &item_names).await?;

    let enchant_ids: Vec<i64> = snapshot
        .items
        .iter()
        .filter_map(|i| i.enchantment_id)
        .collect();
    let enchantments = catalog::upsert_enchantments(db, &enchant_ids).await?;

    let enchant_names: Vec<TranslationRecord> = snapshot
        .items
        .iter()
        .filter_map(|i| {
            Some(TranslationRecord {
                translatable_id: *enchantments.get(&i.enchantment_id?)?,
                key: "name".to_string(),
                locale: locale.to_string(),
                value: i.enchantment_name.clone().filter(|n| !n.is_empty())?,
            })
        })
        .collect();
    catalog::upsert_translations(db, owner::ENCHANTMENT, &enchant_names).await?;

    let mut seen_slots = HashSet::new();
    let mut records = Vec::with_capacity(snapshot.items.len());
    for item in &snapshot.items {
        let Some(&item_id) = item_ids.get(&item.item_id) else {
            continue;
        };
        if !seen_slots.insert(item.slot.clone()) {
            continue;
        }
        records.push(CharacterItemRecord {
            slot: item.slot.clone(),
            item_id,
            item_level: item.item_level,
            enchantment_id: item.enchantment_id,
            sockets: serde_json::to_value(&item.sockets)
                .map_err(|e| SyncError::Unexpected(e.to_string()))?,
            bonus_list: serde_json::json!(item.bonus_list),
        });
    }

    Ok(records)
}

async fn prepare_talents(
    ctx: &SyncContext,
    body: WithRaw<SpecializationsSummary>,
    locale: &str,
    validator: Option<String>,
) -> Result<TalentsUpdate> {
    let db = ctx.db();
    let loadout = extract_talents(&body.parsed);
    upsert_talent_catalog(db, &loadout, locale).await?;

    let attrs = SpecializationAttrs {
        spec_id: loadout.spec_id,
        hero_talent_tree_id: loadout.hero_tree_id,
        hero_talent_tree_name: loadout.hero_tree_name.as_deref().map(str::to_lowercase),
        raw_specialization: Some(body.raw),
        processed_at: Some(Utc::now().fixed_offset()),
    };

    Ok(TalentsUpdate {
        attrs,
        class_slug: loadout.class_slug.as_deref().map(class_slug),
        validator,
    })
}

/// `death knight` -> `death_knight`.
fn class_slug(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

async fn upsert_talent_catalog<C: sea_orm::ConnectionTrait>(
    db: &C,
    loadout: &TalentLoadout,
    locale: &str,
) -> std::result::Result<(), RepositoryError> {
    let extracted = loadout.talent_records();
    if extracted.is_empty() {
        return Ok(());
    }

    let records: Vec<TalentRecord> = extracted
        .iter()
        .map(|t| TalentRecord {
            blizzard_id: t.blizzard_id,
            talent_type: t.talent_type,
            spell_id: t.spell_id,
        })
        .collect();
    let ids = catalog::upsert_talents(db, &records).await?;

    let names: Vec<TranslationRecord> = extracted
        .iter()
        .filter_map(|t| {
            Some(TranslationRecord {
                translatable_id: *ids.get(&(t.blizzard_id, t.talent_type))?,
                key: "name".to_string(),
                locale: locale.to_string(),
                value: t.name.clone().filter(|n| !n.is_empty())?,
            })
        })
        .collect();
    catalog::upsert_translations(db, owner::TALENT, &names).await?;
    Ok(())
}

/// Write entry enrichment, gear and character state in one transaction.
async fn apply_updates(
    ctx: &SyncContext,
    character: &character::Model,
    target_ids: &[i64],
    processed: Option<&pvp_leaderboard_entry::Model>,
    clear_validators: bool,
    equipment: Option<EquipmentUpdate>,
    talents: Option<TalentsUpdate>,
) -> Result<()> {
    let now = Utc::now().fixed_offset();

    let equipment_attrs = match &equipment {
        Some(update) => Some(update.attrs.clone()),
        None => processed.map(EquipmentAttrs::from_entry),
    };
    let talent_attrs = match &talents {
        Some(update) => Some(update.attrs.clone()),
        None => processed.map(SpecializationAttrs::from_entry),
    };

    let mut changes = character::ActiveModel {
        last_equipment_snapshot_at: Set(Some(now)),
        unavailable_until: Set(None),
        ..Default::default()
    };
    if clear_validators {
        changes.equipment_last_modified = Set(None);
        changes.talents_last_modified = Set(None);
    }
    if let Some(update) = &equipment {
        changes.equipment_last_modified = Set(update.validator.clone());
        if let Some((fingerprint, _)) = &update.rebuild {
            changes.equipment_fingerprint = Set(Some(fingerprint.clone()));
        }
    }
    if let Some(update) = &talents {
        changes.talents_last_modified = Set(update.validator.clone());
        if let Some(slug) = &update.class_slug {
            changes.class_slug = Set(Some(slug.clone()));
        }
    }

    let txn = ctx.db().begin().await.map_err(RepositoryError::from)?;

    if let Some(EquipmentUpdate {
        rebuild: Some((_, records)),
        ..
    }) = &equipment
    {
        catalog::replace_character_items(&txn, character.id, records).await?;
    }
    leaderboard_repo::apply_entry_attrs(
        &txn,
        target_ids,
        equipment_attrs.as_ref(),
        talent_attrs.as_ref(),
    )
    .await?;
    character_repo::update_columns(&txn, character.id, changes).await?;

    txn.commit().await.map_err(RepositoryError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_slug_normalizes() {
        assert_eq!(class_slug("Death Knight"), "death_knight");
        assert_eq!(class_slug("  Mage "), "mage");
    }
}
