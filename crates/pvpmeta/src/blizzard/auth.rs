//! Bearer credential provider boundary.
//!
//! Token acquisition (client-credentials OAuth, credential pooling) lives
//! outside this crate. The client only needs something that can hand it a
//! current access token.

use async_trait::async_trait;

use super::error::ApiError;

/// Supplies bearer tokens for upstream requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// A fixed token, typically read from configuration.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ApiError> {
        if self.0.trim().is_empty() {
            return Err(ApiError::config("access token is empty"));
        }
        Ok(self.0.clone())
    }
}
