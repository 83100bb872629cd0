//! Sync context builder.
//!
//! ```ignore
//! use pvpmeta::sync::{SyncContext, SyncOptions};
//!
//! let ctx = SyncContext::builder()
//!     .database(db)
//!     .client(us_client)
//!     .client(eu_client)
//!     .options(SyncOptions::default())
//!     .progress(callback)
//!     .build()?;
//!
//! let report = run_cycle(&ctx).await?;
//! ```

use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use sea_orm::DatabaseConnection;
use tokio::sync::Semaphore;

use crate::blizzard::BlizzardClient;

use super::errors::SyncError;
use super::executor::shared_permits;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::SyncOptions;

/// Error type for building a context.
#[derive(Debug, thiserror::Error)]
pub enum SyncContextError {
    /// Missing required field in builder.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// A configured region has no client.
    #[error("No API client for region '{region}'")]
    MissingClient { region: String },
}

/// Builder for [`SyncContext`].
#[derive(Default)]
pub struct SyncContextBuilder {
    database: Option<Arc<DatabaseConnection>>,
    clients: HashMap<String, BlizzardClient>,
    options: Option<SyncOptions>,
    progress: Option<Arc<ProgressCallback>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl SyncContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database(mut self, db: Arc<DatabaseConnection>) -> Self {
        self.database = Some(db);
        self
    }

    /// Add the client for its region. A later client replaces an earlier one.
    pub fn client(mut self, client: BlizzardClient) -> Self {
        self.clients.insert(client.region().to_string(), client);
        self
    }

    pub fn options(mut self, options: SyncOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn progress(mut self, callback: Arc<ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Set the shutdown flag for graceful shutdown.
    pub fn shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// # Errors
    ///
    /// Fails when the database is missing or a configured region has no client.
    pub fn build(self) -> Result<SyncContext, SyncContextError> {
        let database = self
            .database
            .ok_or(SyncContextError::MissingField { field: "database" })?;
        let options = self.options.unwrap_or_default();

        if let Some(region) = options
            .regions
            .iter()
            .find(|r| !self.clients.contains_key(r.as_str()))
        {
            return Err(SyncContextError::MissingClient {
                region: region.clone(),
            });
        }

        let pool_permits = Arc::new(Semaphore::new(shared_permits(
            options.pool_limit,
            options.regions.len(),
        )));

        Ok(SyncContext {
            database,
            pool_permits,
            clients: Arc::new(self.clients),
            options: Arc::new(options),
            progress: self.progress,
            shutdown_flag: self.shutdown_flag,
        })
    }
}

/// Shared state for one sync cycle. Cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct SyncContext {
    database: Arc<DatabaseConnection>,
    /// Caps pool-bound tasks across all region lanes.
    pool_permits: Arc<Semaphore>,
    clients: Arc<HashMap<String, BlizzardClient>>,
    options: Arc<SyncOptions>,
    progress: Option<Arc<ProgressCallback>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl SyncContext {
    pub fn builder() -> SyncContextBuilder {
        SyncContextBuilder::new()
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.database
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Semaphore every concurrent database task of the cycle acquires.
    pub fn pool_permits(&self) -> Arc<Semaphore> {
        Arc::clone(&self.pool_permits)
    }

    /// Client of `region`.
    pub fn client(&self, region: &str) -> Result<&BlizzardClient, SyncError> {
        self.clients
            .get(region)
            .ok_or_else(|| SyncError::Unexpected(format!("No API client for region '{}'", region)))
    }

    /// Any configured client, for region-independent static data.
    pub fn any_client(&self) -> Option<&BlizzardClient> {
        self.options
            .regions
            .iter()
            .find_map(|r| self.clients.get(r))
            .or_else(|| self.clients.values().next())
    }

    pub fn emit(&self, event: SyncProgress) {
        emit(self.progress.as_deref(), event);
    }

    /// Whether Ctrl+C (or the embedding application) asked to stop.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut regions: Vec<&String> = self.clients.keys().collect();
        regions.sort();
        f.debug_struct("SyncContext")
            .field("regions", &regions)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
