//! Board access tokens read from the key-value store with a TTL cache.
//!
//! Tokens live under `monday-access-token:{accountId}`. Writes go through to
//! the store; reads hit the cache first.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use boardsync_core::{AuthProvider, KeyValueStore};
use boardsync_domain::constants::ACCESS_TOKEN_KEY_PREFIX;
use boardsync_domain::{AccessToken, Result};
use moka::future::Cache;
use tracing::{debug, instrument, warn};

const MAX_CACHED_ACCOUNTS: u64 = 10_000;

pub fn access_token_key(account_id: &str) -> String {
    format!("{ACCESS_TOKEN_KEY_PREFIX}:{account_id}")
}

/// [`AuthProvider`] over a [`KeyValueStore`]
pub struct StoredTokenProvider {
    store: Arc<dyn KeyValueStore>,
    cache: Cache<String, AccessToken>,
}

impl StoredTokenProvider {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        let cache = Cache::builder().time_to_live(ttl).max_capacity(MAX_CACHED_ACCOUNTS).build();
        Self { store, cache }
    }

    #[instrument(skip(self, token))]
    pub async fn store_access_token(&self, account_id: &str, token: &AccessToken) -> Result<()> {
        let json = serde_json::to_string(token)?;
        self.store.set(&access_token_key(account_id), &json).await?;
        self.cache.insert(account_id.to_string(), token.clone()).await;
        Ok(())
    }

    /// Returns whether a stored token was removed.
    #[instrument(skip(self))]
    pub async fn remove_access_token(&self, account_id: &str) -> Result<bool> {
        self.cache.invalidate(account_id).await;
        self.store.delete(&access_token_key(account_id)).await
    }
}

#[async_trait]
impl AuthProvider for StoredTokenProvider {
    async fn get_access_token(&self, account_id: &str) -> Result<Option<AccessToken>> {
        if let Some(token) = self.cache.get(account_id).await {
            return Ok(Some(token));
        }

        let Some(raw) = self.store.get(&access_token_key(account_id)).await? else {
            debug!(account_id, "no stored access token");
            return Ok(None);
        };

        match parse_token(&raw) {
            Some(token) => {
                self.cache.insert(account_id.to_string(), token.clone()).await;
                Ok(Some(token))
            }
            None => {
                warn!(account_id, "stored access token is unreadable");
                Ok(None)
            }
        }
    }
}

/// A token object, a JSON string, or the bare token.
fn parse_token(raw: &str) -> Option<AccessToken> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str::<AccessToken>(trimmed)
            .ok()
            .filter(|token| !token.access_token.is_empty());
    }
    let bare = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).ok()?
    } else {
        trimmed.to_string()
    };
    (!bare.is_empty()).then(|| AccessToken::bearer(bare))
}
