use std::sync::Arc;
use std::time::Duration;

use pvpmeta::blizzard::{ApiRateLimiter, BlizzardClient, ClientOptions, StaticToken};
use pvpmeta::policy::region_policy_for;
use pvpmeta::retry::RetryConfig;
use pvpmeta::{RepositoryError, db};
use pvpmeta::{PvpSeasonModel, repository};
use sea_orm::DatabaseConnection;

use crate::config::{BlizzardConfig, Config};

/// Connect with the pool size the sync executor will plan around.
pub(crate) async fn connect(
    config: &Config,
    database_url: &str,
) -> Result<Arc<DatabaseConnection>, Box<dyn std::error::Error>> {
    let db = db::connect_with(database_url, Some(config.database.max_connections)).await?;
    Ok(Arc::new(db))
}

/// One client per region, each with its own rate limiter.
pub(crate) fn build_clients(
    config: &BlizzardConfig,
    regions: &[String],
    no_rate_limit: bool,
) -> Result<Vec<BlizzardClient>, Box<dyn std::error::Error>> {
    let token = config.token.clone().ok_or(
        "No API token configured. Set PVPMETA_BLIZZARD_TOKEN or [blizzard].token in the config file.",
    )?;
    let tokens = Arc::new(StaticToken::new(token));

    regions
        .iter()
        .map(|region| -> Result<BlizzardClient, Box<dyn std::error::Error>> {
            let policy = region_policy_for(region)
                .ok_or_else(|| format!("Region '{}' is not synced (expected us or eu)", region))?;
            let options = ClientOptions {
                timeout: Duration::from_secs(config.timeout_secs),
                retry: RetryConfig::default().with_max_retries(config.max_retries),
                rate_limiter: (!no_rate_limit)
                    .then(|| ApiRateLimiter::new(config.rps, config.hourly_quota)),
            };
            let client = BlizzardClient::new(region, policy.locale, tokens.clone(), options)?;
            Ok(client)
        })
        .collect()
}

/// The season with `blizzard_id`, or the current one.
pub(crate) async fn resolve_season(
    db: &DatabaseConnection,
    blizzard_id: Option<i64>,
) -> Result<PvpSeasonModel, Box<dyn std::error::Error>> {
    let season = match blizzard_id {
        Some(id) => repository::leaderboard::find_season_by_blizzard_id(db, id).await?,
        None => repository::leaderboard::current_season(db).await?,
    };

    season.ok_or_else(|| {
        let context = match blizzard_id {
            Some(id) => format!("season {}", id),
            None => "current season. Register one with: pvpmeta season set <ID>".to_string(),
        };
        RepositoryError::NotFound { context }.into()
    })
}
