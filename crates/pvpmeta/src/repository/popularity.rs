//! Popularity aggregate tables: wholesale replacement and read helpers.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, TransactionTrait,
};

use crate::entity::enchant_popularity::{self, Entity as EnchantPopularity};
use crate::entity::gem_popularity::{self, Entity as GemPopularity};
use crate::entity::item_popularity::{self, Entity as ItemPopularity};

use super::errors::Result;

const INSERT_CHUNK: usize = 500;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Page number (0-indexed).
    pub page: u64,
    pub per_page: u64,
}

const MIN_PER_PAGE: u64 = 1;

impl Pagination {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page: per_page.max(MIN_PER_PAGE),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: 50,
        }
    }
}

/// One page of a list query.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// Narrowing for popularity reads. `season_id` is required.
#[derive(Debug, Clone, Default)]
pub struct PopularityFilter {
    pub season_id: i64,
    pub bracket: Option<String>,
    pub spec_id: Option<i32>,
    pub slot: Option<String>,
}

impl PopularityFilter {
    pub fn season(season_id: i64) -> Self {
        Self {
            season_id,
            ..Default::default()
        }
    }

    pub fn bracket(mut self, bracket: impl Into<String>) -> Self {
        self.bracket = Some(bracket.into());
        self
    }

    pub fn spec(mut self, spec_id: i32) -> Self {
        self.spec_id = Some(spec_id);
        self
    }

    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into().to_uppercase());
        self
    }
}

// ─── Replacement ─────────────────────────────────────────────────────────────

/// Delete every row of `season_id` and insert `models`, in one transaction.
async fn replace_season_rows<C, E, A>(
    db: &C,
    season_column: E::Column,
    season_id: i64,
    models: Vec<A>,
) -> Result<u64>
where
    C: ConnectionTrait + TransactionTrait,
    E: EntityTrait,
    A: ActiveModelTrait<Entity = E> + Clone + Send,
    E::Model: sea_orm::IntoActiveModel<A>,
{
    let txn = db.begin().await?;

    E::delete_many()
        .filter(season_column.eq(season_id))
        .exec(&txn)
        .await?;

    let mut inserted = 0u64;
    for chunk in models.chunks(INSERT_CHUNK) {
        inserted += E::insert_many(chunk.to_vec())
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(inserted)
}

pub async fn replace_item_popularity<C>(
    db: &C,
    season_id: i64,
    models: Vec<item_popularity::ActiveModel>,
) -> Result<u64>
where
    C: ConnectionTrait + TransactionTrait,
{
    replace_season_rows(db, item_popularity::Column::PvpSeasonId, season_id, models).await
}

pub async fn replace_enchant_popularity<C>(
    db: &C,
    season_id: i64,
    models: Vec<enchant_popularity::ActiveModel>,
) -> Result<u64>
where
    C: ConnectionTrait + TransactionTrait,
{
    replace_season_rows(db, enchant_popularity::Column::PvpSeasonId, season_id, models).await
}

pub async fn replace_gem_popularity<C>(
    db: &C,
    season_id: i64,
    models: Vec<gem_popularity::ActiveModel>,
) -> Result<u64>
where
    C: ConnectionTrait + TransactionTrait,
{
    replace_season_rows(db, gem_popularity::Column::PvpSeasonId, season_id, models).await
}

// ─── Queries ─────────────────────────────────────────────────────────────────

async fn fetch_page<C, E>(
    db: &C,
    select: Select<E>,
    pagination: &Pagination,
) -> Result<PaginatedResult<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let paginator = select.paginate(db, pagination.per_page);

    let total = paginator.num_items().await?;
    let total_pages = paginator.num_pages().await?;
    let items = paginator.fetch_page(pagination.page).await?;

    Ok(PaginatedResult {
        items,
        total,
        page: pagination.page,
        per_page: pagination.per_page,
        total_pages,
    })
}

/// Item popularity, most used first within each (bracket, spec, slot).
pub async fn list_items<C: ConnectionTrait>(
    db: &C,
    filter: &PopularityFilter,
    pagination: &Pagination,
) -> Result<PaginatedResult<item_popularity::Model>> {
    use item_popularity::Column;

    let mut select = ItemPopularity::find().filter(Column::PvpSeasonId.eq(filter.season_id));
    if let Some(bracket) = &filter.bracket {
        select = select.filter(Column::Bracket.eq(bracket.as_str()));
    }
    if let Some(spec_id) = filter.spec_id {
        select = select.filter(Column::SpecId.eq(spec_id));
    }
    if let Some(slot) = &filter.slot {
        select = select.filter(Column::Slot.eq(slot.as_str()));
    }

    let select = select
        .order_by_asc(Column::Bracket)
        .order_by_asc(Column::SpecId)
        .order_by_asc(Column::Slot)
        .order_by_desc(Column::UsageCount)
        .order_by_asc(Column::ItemId);

    fetch_page(db, select, pagination).await
}

pub async fn list_enchants<C: ConnectionTrait>(
    db: &C,
    filter: &PopularityFilter,
    pagination: &Pagination,
) -> Result<PaginatedResult<enchant_popularity::Model>> {
    use enchant_popularity::Column;

    let mut select = EnchantPopularity::find().filter(Column::PvpSeasonId.eq(filter.season_id));
    if let Some(bracket) = &filter.bracket {
        select = select.filter(Column::Bracket.eq(bracket.as_str()));
    }
    if let Some(spec_id) = filter.spec_id {
        select = select.filter(Column::SpecId.eq(spec_id));
    }
    if let Some(slot) = &filter.slot {
        select = select.filter(Column::Slot.eq(slot.as_str()));
    }

    let select = select
        .order_by_asc(Column::Bracket)
        .order_by_asc(Column::SpecId)
        .order_by_asc(Column::Slot)
        .order_by_desc(Column::UsageCount)
        .order_by_asc(Column::EnchantmentId);

    fetch_page(db, select, pagination).await
}

pub async fn list_gems<C: ConnectionTrait>(
    db: &C,
    filter: &PopularityFilter,
    pagination: &Pagination,
) -> Result<PaginatedResult<gem_popularity::Model>> {
    use gem_popularity::Column;

    let mut select = GemPopularity::find().filter(Column::PvpSeasonId.eq(filter.season_id));
    if let Some(bracket) = &filter.bracket {
        select = select.filter(Column::Bracket.eq(bracket.as_str()));
    }
    if let Some(spec_id) = filter.spec_id {
        select = select.filter(Column::SpecId.eq(spec_id));
    }
    if let Some(slot) = &filter.slot {
        select = select.filter(Column::Slot.eq(slot.as_str()));
    }

    let select = select
        .order_by_asc(Column::Bracket)
        .order_by_asc(Column::SpecId)
        .order_by_asc(Column::Slot)
        .order_by_asc(Column::SocketType)
        .order_by_desc(Column::UsageCount)
        .order_by_asc(Column::ItemId);

    fetch_page(db, select, pagination).await
}

/// Number of item popularity rows stored for a season.
pub async fn count_items<C: ConnectionTrait>(db: &C, season_id: i64) -> Result<u64> {
    Ok(ItemPopularity::find()
        .filter(item_popularity::Column::PvpSeasonId.eq(season_id))
        .count(db)
        .await?)
}
