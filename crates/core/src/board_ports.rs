//! Board platform ports

use async_trait::async_trait;
use boardsync_domain::{AccessToken, BoardMutation, MutationOutcome, Result};

/// Resolves the stored access token for a board account
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `Ok(None)` when the account has no stored token.
    async fn get_access_token(&self, account_id: &str) -> Result<Option<AccessToken>>;
}

/// Executes mutations against the board platform
#[async_trait]
pub trait BoardClient: Send + Sync {
    /// Transport failures are errors; a platform-level rejection comes back
    /// as an outcome with `success == false`.
    async fn mutate(&self, access_token: &str, mutation: &BoardMutation)
        -> Result<MutationOutcome>;
}
