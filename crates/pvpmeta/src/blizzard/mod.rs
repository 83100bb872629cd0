//! Game API client.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for upstream operations
//! - [`auth`] - Bearer token provider boundary
//! - [`rate_limit`] - Dual-bucket proactive rate limiter
//! - [`conditional`] - `If-Modified-Since` / `If-None-Match` results
//! - [`client`] - Region/locale-bound client and resource helpers
//! - [`types`] - Payload shapes
//!
//! ```ignore
//! use pvpmeta::blizzard::{BlizzardClient, ClientOptions, StaticToken};
//!
//! let client = BlizzardClient::new("eu", "en_GB", Arc::new(StaticToken::new(token)), ClientOptions::default())?;
//! let board = client.leaderboard(40, "3v3").await?;
//! ```

mod auth;
mod client;
mod conditional;
mod error;
mod rate_limit;
pub mod types;

pub use auth::{StaticToken, TokenProvider};
pub use client::{
    BlizzardClient, ClientOptions, DEFAULT_LOCALE, DEFAULT_TIMEOUT_SECS, ResourceKind,
    VALID_REGIONS, character_path, valid_locales,
};
pub use conditional::{Conditional, Validator};
pub use error::{ApiError, short_error_message};
pub use rate_limit::{ApiRateLimiter, rate_limits};
