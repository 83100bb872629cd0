//! Storage operations over the sea-orm entities.
//!
//! Every function is generic over [`sea_orm::ConnectionTrait`] so it can run
//! against a pooled connection or inside a transaction. Bulk writes go through
//! [`with_write_retry`], which backs off on transient database errors such as
//! SQLite's `database is locked`.

pub mod catalog;
pub mod character;
mod errors;
pub mod leaderboard;
pub mod popularity;
pub mod sync_cycle;

pub use errors::{
    DEFAULT_BULK_WRITE_BACKOFF_MS, DEFAULT_BULK_WRITE_RETRIES, RepositoryError, Result,
    with_write_retry,
};
pub use popularity::{PaginatedResult, Pagination, PopularityFilter};
