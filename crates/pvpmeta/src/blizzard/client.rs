//! Region/locale-aware game API client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde::de::DeserializeOwned;

use super::auth::TokenProvider;
use super::conditional::{Conditional, Validator};
use super::error::{ApiError, short_error_message};
use super::rate_limit::{ApiRateLimiter, rate_limits};
use super::types::{
    CharacterProfile, EquipmentSummary, Leaderboard, LeaderboardsIndex, MediaDocument,
    SpecializationsSummary, WithRaw,
};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::retry::{RetryConfig, with_retry};

/// Regions the upstream API serves.
pub const VALID_REGIONS: &[&str] = &["us", "eu", "kr", "tw"];

/// Locale used when a caller has no preference.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Locales accepted for a region, or `None` for an unknown region.
pub fn valid_locales(region: &str) -> Option<&'static [&'static str]> {
    match region {
        "us" => Some(&["en_US", "es_MX", "pt_BR"]),
        "eu" => Some(&["en_GB", "es_ES", "fr_FR", "de_DE", "it_IT", "ru_RU"]),
        "kr" => Some(&["ko_KR"]),
        "tw" => Some(&["zh_TW"]),
        _ => None,
    }
}

/// Endpoint partition. Upstream splits its API into namespaces per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Catalog data that changes only with game patches (items, media).
    Static,
    /// Frequently changing game data (leaderboards, seasons).
    Dynamic,
    /// Character-specific data.
    Profile,
}

impl ResourceKind {
    pub fn namespace(self, region: &str) -> String {
        let prefix = match self {
            ResourceKind::Static => "static",
            ResourceKind::Dynamic => "dynamic",
            ResourceKind::Profile => "profile",
        };
        format!("{}-{}", prefix, region)
    }
}

/// Construction options for [`BlizzardClient`].
#[derive(Clone)]
pub struct ClientOptions {
    /// Per-request timeout.
    pub timeout: StdDuration,
    /// Retry policy for 429 responses.
    pub retry: RetryConfig,
    /// Shared limiter. `None` disables proactive limiting.
    pub rate_limiter: Option<ApiRateLimiter>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
            rate_limiter: Some(ApiRateLimiter::default()),
        }
    }
}

/// Game API client bound to one region and locale.
#[derive(Clone)]
pub struct BlizzardClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
    region: String,
    locale: String,
    retry: RetryConfig,
    rate_limiter: Option<ApiRateLimiter>,
}

impl std::fmt::Debug for BlizzardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlizzardClient")
            .field("region", &self.region)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl BlizzardClient {
    /// Create a client using the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` when the region is unsupported or the
    /// locale is not valid for the region.
    pub fn new(
        region: &str,
        locale: &str,
        tokens: Arc<dyn TokenProvider>,
        options: ClientOptions,
    ) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::with_timeout(options.timeout)
            .map_err(|e| ApiError::config(e.to_string()))?;
        Self::new_with_transport(region, locale, tokens, options, Arc::new(transport))
    }

    pub fn new_with_transport(
        region: &str,
        locale: &str,
        tokens: Arc<dyn TokenProvider>,
        options: ClientOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ApiError> {
        let allowed = valid_locales(region)
            .ok_or_else(|| ApiError::config(format!("Unsupported API region: {}", region)))?;
        if !allowed.contains(&locale) {
            return Err(ApiError::config(format!(
                "Invalid locale '{}' for region '{}'",
                locale, region
            )));
        }

        Ok(Self {
            transport,
            tokens,
            region: region.to_string(),
            locale: locale.to_string(),
            retry: options.retry,
            rate_limiter: options.rate_limiter,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Full request URL, including the `namespace` and `locale` parameters.
    pub fn url(&self, kind: ResourceKind, path: &str) -> String {
        format!(
            "https://{}.api.blizzard.com{}?namespace={}&locale={}",
            self.region,
            path,
            kind.namespace(&self.region),
            self.locale
        )
    }

    /// Fetch and decode a resource.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(kind, path, None).await?;
        if response.status != 200 {
            return Err(status_error(path, &response));
        }
        parse_body(&response)
    }

    /// Conditional fetch using `If-None-Match`.
    pub async fn fetch_with_etag<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        path: &str,
        etag: Option<&str>,
    ) -> Result<Conditional<T>, ApiError> {
        self.fetch_conditional(kind, path, Validator::ETag, etag)
            .await
    }

    /// Conditional fetch using `If-Modified-Since`.
    pub async fn fetch_with_last_modified<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        path: &str,
        last_modified: Option<&str>,
    ) -> Result<Conditional<T>, ApiError> {
        self.fetch_conditional(kind, path, Validator::LastModified, last_modified)
            .await
    }

    async fn fetch_conditional<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        path: &str,
        validator: Validator,
        cached: Option<&str>,
    ) -> Result<Conditional<T>, ApiError> {
        let conditional = cached.map(|value| (validator.request_header(), value));
        let response = self.send(kind, path, conditional).await?;

        match response.status {
            304 => Ok(Conditional::not_modified(cached)),
            200 => {
                let body = parse_body(&response)?;
                let new_validator = response
                    .header(validator.response_header())
                    .map(str::to_string);
                Ok(Conditional::fetched(body, new_validator))
            }
            _ => Err(status_error(path, &response)),
        }
    }

    /// Send with rate limiting, retrying 429s with backoff.
    async fn send(
        &self,
        kind: ResourceKind,
        path: &str,
        conditional: Option<(&str, &str)>,
    ) -> Result<HttpResponse, ApiError> {
        let url = self.url(kind, path);

        with_retry(
            || self.send_once(&url, path, conditional),
            self.retry.clone(),
            ApiError::is_rate_limited,
            short_error_message,
            path,
        )
        .await
    }

    async fn send_once(
        &self,
        url: &str,
        path: &str,
        conditional: Option<(&str, &str)>,
    ) -> Result<HttpResponse, ApiError> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let token = self.tokens.access_token().await?;
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), "pvpmeta".to_string()),
            ("Authorization".to_string(), format!("Bearer {}", token)),
        ];
        if let Some((name, value)) = conditional {
            headers.push((name.to_string(), value.to_string()));
        }

        let response = self
            .transport
            .send(HttpRequest {
                url: url.to_string(),
                headers,
            })
            .await?;

        if response.status == 429 {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.penalize(StdDuration::from_secs(rate_limits::PENALTY_SECS));
            }
            tracing::warn!(region = %self.region, path, "Upstream returned 429");
            return Err(ApiError::RateLimited {
                path: path.to_string(),
            });
        }

        Ok(response)
    }
}

// ─── Resource helpers ───────────────────────────────────────────────────────

impl BlizzardClient {
    /// Brackets with a leaderboard in the given season.
    pub async fn leaderboards_index(&self, season_id: i64) -> Result<LeaderboardsIndex, ApiError> {
        let path = format!("/data/wow/pvp-season/{}/pvp-leaderboard/index", season_id);
        self.fetch(ResourceKind::Dynamic, &path).await
    }

    pub async fn leaderboard(&self, season_id: i64, bracket: &str) -> Result<Leaderboard, ApiError> {
        let path = format!(
            "/data/wow/pvp-season/{}/pvp-leaderboard/{}",
            season_id,
            urlencoding::encode(bracket)
        );
        self.fetch(ResourceKind::Dynamic, &path).await
    }

    pub async fn character_profile(
        &self,
        realm: &str,
        name: &str,
    ) -> Result<CharacterProfile, ApiError> {
        self.fetch(ResourceKind::Profile, &character_path(realm, name, ""))
            .await
    }

    pub async fn character_media(&self, realm: &str, name: &str) -> Result<MediaDocument, ApiError> {
        self.fetch(
            ResourceKind::Profile,
            &character_path(realm, name, "/character-media"),
        )
        .await
    }

    pub async fn character_equipment(
        &self,
        realm: &str,
        name: &str,
        last_modified: Option<&str>,
    ) -> Result<Conditional<WithRaw<EquipmentSummary>>, ApiError> {
        self.fetch_with_last_modified(
            ResourceKind::Profile,
            &character_path(realm, name, "/equipment"),
            last_modified,
        )
        .await
    }

    pub async fn character_specializations(
        &self,
        realm: &str,
        name: &str,
        last_modified: Option<&str>,
    ) -> Result<Conditional<WithRaw<SpecializationsSummary>>, ApiError> {
        self.fetch_with_last_modified(
            ResourceKind::Profile,
            &character_path(realm, name, "/specializations"),
            last_modified,
        )
        .await
    }

    pub async fn item_media(&self, item_id: i64) -> Result<MediaDocument, ApiError> {
        let path = format!("/data/wow/media/item/{}", item_id);
        self.fetch(ResourceKind::Static, &path).await
    }
}

/// `/profile/wow/character/{realm}/{name}{suffix}` with lowercased,
/// percent-encoded segments.
pub fn character_path(realm: &str, name: &str, suffix: &str) -> String {
    format!(
        "/profile/wow/character/{}/{}{}",
        urlencoding::encode(&realm.to_lowercase()),
        urlencoding::encode(&name.to_lowercase()),
        suffix
    )
}

fn status_error(path: &str, response: &HttpResponse) -> ApiError {
    match response.status {
        404 => ApiError::NotFound {
            path: path.to_string(),
        },
        429 => ApiError::RateLimited {
            path: path.to_string(),
        },
        status => ApiError::Status {
            status,
            body: response.body_text(),
        },
    }
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| ApiError::Parse {
        message: e.to_string(),
        body: response.body_text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blizzard::auth::StaticToken;
    use crate::http::{HttpResponse, MockTransport};
    use serde_json::{Value, json};

    fn options() -> ClientOptions {
        ClientOptions {
            timeout: StdDuration::from_secs(1),
            retry: RetryConfig::new(StdDuration::from_millis(1), StdDuration::from_millis(2), 1)
                .with_jitter(false),
            rate_limiter: None,
        }
    }

    fn client(transport: &MockTransport) -> BlizzardClient {
        BlizzardClient::new_with_transport(
            "us",
            "en_US",
            Arc::new(StaticToken::new("tok")),
            options(),
            Arc::new(transport.clone()),
        )
        .expect("valid client")
    }

    const ITEM_URL: &str =
        "https://us.api.blizzard.com/data/wow/media/item/19019?namespace=static-us&locale=en_US";

    #[test]
    fn rejects_unknown_region() {
        let err = BlizzardClient::new_with_transport(
            "cn",
            "zh_CN",
            Arc::new(StaticToken::new("tok")),
            options(),
            Arc::new(MockTransport::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(msg) if msg.contains("cn")));
    }

    #[test]
    fn rejects_locale_from_another_region() {
        let err = BlizzardClient::new_with_transport(
            "eu",
            "en_US",
            Arc::new(StaticToken::new("tok")),
            options(),
            Arc::new(MockTransport::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(msg) if msg.contains("en_US")));
    }

    #[test]
    fn namespaces_follow_resource_kind() {
        assert_eq!(ResourceKind::Static.namespace("eu"), "static-eu");
        assert_eq!(ResourceKind::Dynamic.namespace("us"), "dynamic-us");
        assert_eq!(ResourceKind::Profile.namespace("kr"), "profile-kr");
    }

    #[test]
    fn every_region_has_locales() {
        for region in VALID_REGIONS {
            assert!(valid_locales(region).is_some_and(|l| !l.is_empty()));
        }
        assert!(valid_locales("us").unwrap().contains(&DEFAULT_LOCALE));
    }

    #[tokio::test]
    async fn fetch_sends_bearer_and_parses_json() {
        let transport = MockTransport::new();
        transport.push_json(ITEM_URL, json!({"id": 19019}));

        let body: Value = client(&transport)
            .fetch(ResourceKind::Static, "/data/wow/media/item/19019")
            .await
            .expect("fetch should succeed");
        assert_eq!(body["id"], 19019);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            crate::http::header_get(&requests[0].headers, "authorization"),
            Some("Bearer tok")
        );
    }

    #[tokio::test]
    async fn fetch_maps_404_to_not_found() {
        let transport = MockTransport::new();
        transport.push_status(ITEM_URL, 404);

        let err = client(&transport)
            .fetch::<Value>(ResourceKind::Static, "/data/wow/media/item/19019")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn fetch_maps_other_status_with_body() {
        let transport = MockTransport::new();
        transport.push_response(
            ITEM_URL,
            HttpResponse {
                status: 503,
                headers: Vec::new(),
                body: b"upstream down".to_vec(),
            },
        );

        let err = client(&transport)
            .fetch::<Value>(ResourceKind::Static, "/data/wow/media/item/19019")
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_reports_parse_errors_with_raw_body() {
        let transport = MockTransport::new();
        transport.push_response(
            ITEM_URL,
            HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: b"<html>".to_vec(),
            },
        );

        let err = client(&transport)
            .fetch::<Value>(ResourceKind::Static, "/data/wow/media/item/19019")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse { body, .. } if body == "<html>"));
    }

    #[tokio::test]
    async fn fetch_retries_429_then_succeeds() {
        let transport = MockTransport::new();
        transport.push_status(ITEM_URL, 429);
        transport.push_json(ITEM_URL, json!({"ok": true}));

        let body: Value = client(&transport)
            .fetch(ResourceKind::Static, "/data/wow/media/item/19019")
            .await
            .expect("retry should succeed");
        assert_eq!(body["ok"], true);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn fetch_surfaces_rate_limited_after_retries() {
        let transport = MockTransport::new();
        transport.push_status(ITEM_URL, 429);
        transport.push_status(ITEM_URL, 429);

        let err = client(&transport)
            .fetch::<Value>(ResourceKind::Static, "/data/wow/media/item/19019")
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn last_modified_304_returns_unchanged_triple() {
        let transport = MockTransport::new();
        transport.push_status(ITEM_URL, 304);

        let stamp = "Wed, 04 Feb 2026 03:31:52 GMT";
        let result = client(&transport)
            .fetch_with_last_modified::<Value>(
                ResourceKind::Static,
                "/data/wow/media/item/19019",
                Some(stamp),
            )
            .await
            .expect("304 is not an error");

        assert!(result.body.is_none());
        assert!(!result.changed);
        assert_eq!(result.validator.as_deref(), Some(stamp));

        let requests = transport.requests();
        assert_eq!(
            crate::http::header_get(&requests[0].headers, "if-modified-since"),
            Some(stamp)
        );
    }

    #[tokio::test]
    async fn last_modified_200_returns_new_validator() {
        let transport = MockTransport::new();
        transport.push_response(
            ITEM_URL,
            HttpResponse {
                status: 200,
                headers: vec![(
                    "last-modified".to_string(),
                    "Thu, 05 Feb 2026 00:00:00 GMT".to_string(),
                )],
                body: b"{\"id\":1}".to_vec(),
            },
        );

        let result = client(&transport)
            .fetch_with_last_modified::<Value>(
                ResourceKind::Static,
                "/data/wow/media/item/19019",
                None,
            )
            .await
            .unwrap();

        assert!(result.changed);
        assert_eq!(result.body.unwrap()["id"], 1);
        assert_eq!(
            result.validator.as_deref(),
            Some("Thu, 05 Feb 2026 00:00:00 GMT")
        );
        assert!(
            crate::http::header_get(&transport.requests()[0].headers, "if-modified-since")
                .is_none()
        );
    }

    #[tokio::test]
    async fn etag_conditional_sends_if_none_match() {
        let transport = MockTransport::new();
        transport.push_status(ITEM_URL, 304);

        let result = client(&transport)
            .fetch_with_etag::<Value>(
                ResourceKind::Static,
                "/data/wow/media/item/19019",
                Some("\"v1\""),
            )
            .await
            .unwrap();
        assert!(result.is_not_modified());
        assert_eq!(
            crate::http::header_get(&transport.requests()[0].headers, "if-none-match"),
            Some("\"v1\"")
        );
    }

    #[test]
    fn character_path_lowercases_and_encodes() {
        assert_eq!(
            character_path("Area-52", "Bjørn", "/equipment"),
            "/profile/wow/character/area-52/bj%C3%B8rn/equipment"
        );
        assert_eq!(
            character_path("stormrage", "Zed", ""),
            "/profile/wow/character/stormrage/zed"
        );
    }

    #[tokio::test]
    async fn leaderboard_uses_dynamic_namespace() {
        let transport = MockTransport::new();
        transport.push_json(
            "https://us.api.blizzard.com/data/wow/pvp-season/40/pvp-leaderboard/3v3?namespace=dynamic-us&locale=en_US",
            json!({"entries": [{"character": {"id": 1, "name": "a", "realm": {"slug": "r"}}, "rank": 1, "rating": 2400}]}),
        );

        let lb = client(&transport).leaderboard(40, "3v3").await.unwrap();
        assert_eq!(lb.entries.len(), 1);
        assert_eq!(lb.entries[0].rating, 2400);
    }

    #[tokio::test]
    async fn leaderboard_encodes_bracket_segment() {
        let transport = MockTransport::new();
        transport.push_json(
            "https://us.api.blizzard.com/data/wow/pvp-season/40/pvp-leaderboard/shuffle%20mage%2Farcane?namespace=dynamic-us&locale=en_US",
            json!({"entries": []}),
        );

        let lb = client(&transport)
            .leaderboard(40, "shuffle mage/arcane")
            .await
            .unwrap();
        assert!(lb.entries.is_empty());
    }

    #[tokio::test]
    async fn character_equipment_uses_profile_namespace() {
        let transport = MockTransport::new();
        transport.push_status(
            "https://us.api.blizzard.com/profile/wow/character/area-52/zed/equipment?namespace=profile-us&locale=en_US",
            304,
        );

        let result = client(&transport)
            .character_equipment("Area-52", "Zed", Some("stamp"))
            .await
            .unwrap();
        assert!(result.is_not_modified());
    }

    #[tokio::test]
    async fn transport_failure_is_transport_error() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .fetch::<Value>(ResourceKind::Static, "/data/wow/media/item/19019")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
