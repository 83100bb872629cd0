//! pvpmeta - PvP leaderboard sync and gear popularity aggregation.
//!
//! This library mirrors the rated PvP leaderboards of the game API into a
//! relational store, enriches the top characters with their equipment and
//! talents, and aggregates item, enchant and gem popularity per bracket and
//! specialization.
//!
//! # Features
//!
//! - `sqlite` / `postgres` - Database drivers.
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to create the schema on connection.
//!
//! # Example
//!
//! ```ignore
//! use pvpmeta::{connect_and_migrate, sync};
//!
//! let db = connect_and_migrate("sqlite://pvpmeta.db?mode=rwc").await?;
//! let ctx = sync::SyncContext::builder()
//!     .database(Arc::new(db))
//!     .client(us_client)
//!     .client(eu_client)
//!     .build()?;
//! let report = sync::run_cycle(&ctx).await?;
//! ```

pub mod aggregation;
pub mod blizzard;
pub mod db;
pub mod entity;
pub mod http;
pub mod policy;
pub mod repository;
pub mod retry;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use aggregation::{AggregationCounts, run_aggregations};
pub use blizzard::{ApiError, ApiRateLimiter, BlizzardClient, ClientOptions, StaticToken};
pub use db::{connect, connect_with};
#[cfg(feature = "migrate")]
pub use db::{connect_and_migrate, connect_and_migrate_with};
pub use entity::prelude::*;
pub use repository::RepositoryError;
pub use sync::{SyncContext, SyncError, SyncOptions, run_cycle};
