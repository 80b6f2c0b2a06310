//! Key-value storage port

use async_trait::async_trait;
use boardsync_domain::Result;

/// Opaque string storage keyed by the prefixes in
/// `boardsync_domain::constants`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns whether a value was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}
