//! Sync cycle bookkeeping.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

use crate::entity::pvp_sync_cycle::{ActiveModel, Column, Entity as PvpSyncCycle, Model};
use crate::entity::sync_cycle_status::SyncCycleStatus;

use super::errors::{RepositoryError, Result};

/// Open a new cycle in `syncing_leaderboards`.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    season_id: i64,
    regions: &[String],
    snapshot_at: DateTime<FixedOffset>,
) -> Result<Model> {
    let now = Utc::now().fixed_offset();
    let model = ActiveModel {
        pvp_season_id: Set(season_id),
        status: Set(SyncCycleStatus::SyncingLeaderboards),
        regions: Set(serde_json::json!(regions)),
        snapshot_at: Set(snapshot_at),
        expected_character_batches: Set(0),
        completed_character_batches: Set(0),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Model>> {
    Ok(PvpSyncCycle::find_by_id(id).one(db).await?)
}

/// Most recently created cycle.
pub async fn latest<C: ConnectionTrait>(db: &C) -> Result<Option<Model>> {
    Ok(PvpSyncCycle::find()
        .order_by_desc(Column::Id)
        .one(db)
        .await?)
}

/// Move a cycle to `status`. Terminal cycles are left unchanged.
pub async fn set_status<C: ConnectionTrait>(db: &C, id: i64, status: SyncCycleStatus) -> Result<()> {
    let now = Utc::now().fixed_offset();
    let mut changes = ActiveModel {
        status: Set(status),
        updated_at: Set(now),
        ..Default::default()
    };
    if status.is_terminal() {
        changes.completed_at = Set(Some(now));
    }

    let result = PvpSyncCycle::update_many()
        .set(changes)
        .filter(Column::Id.eq(id))
        .filter(Column::Status.is_not_in([SyncCycleStatus::Completed, SyncCycleStatus::Failed]))
        .exec(db)
        .await?;

    if result.rows_affected == 0 && find_by_id(db, id).await?.is_none() {
        return Err(RepositoryError::not_found_by_id("pvp_sync_cycles", id));
    }
    Ok(())
}

/// Add to the expected batch count. Region lanes each contribute their own.
pub async fn add_expected_batches<C: ConnectionTrait>(db: &C, id: i64, batches: i32) -> Result<()> {
    PvpSyncCycle::update_many()
        .col_expr(
            Column::ExpectedCharacterBatches,
            Expr::col(Column::ExpectedCharacterBatches).add(batches),
        )
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Atomically bump the completed batch counter.
pub async fn increment_completed_batches<C: ConnectionTrait>(db: &C, id: i64) -> Result<()> {
    PvpSyncCycle::update_many()
        .col_expr(
            Column::CompletedCharacterBatches,
            Expr::col(Column::CompletedCharacterBatches).add(1),
        )
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn complete<C: ConnectionTrait>(db: &C, id: i64) -> Result<()> {
    set_status(db, id, SyncCycleStatus::Completed).await
}

pub async fn fail<C: ConnectionTrait>(db: &C, id: i64) -> Result<()> {
    set_status(db, id, SyncCycleStatus::Failed).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn set_status_on_missing_cycle_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let err = complete(&db, 7).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
