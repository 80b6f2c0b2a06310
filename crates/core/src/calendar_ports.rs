//! Calendar change feed port

use async_trait::async_trait;
use boardsync_domain::{
    ChangePage, ChangeRequest, InsertEventRequest, RawCalendarEvent, Result, WatchRequest,
    WatchResponse,
};

/// Trait for the calendar provider's events API: incremental reads, push
/// channels and inserts
#[async_trait]
pub trait ChangeFeedProvider: Send + Sync {
    /// Fetch one page of changes. A rejected sync token must surface as
    /// `BoardSyncError::CursorInvalidated`.
    async fn list_changes(&self, request: ChangeRequest<'_>) -> Result<ChangePage>;

    /// Open a push channel on a calendar
    async fn watch(&self, request: &WatchRequest) -> Result<WatchResponse>;

    /// Close a push channel
    async fn stop(&self, access_token: &str, channel_id: &str, resource_id: &str) -> Result<()>;

    /// Create an event and return it as the provider stored it
    async fn insert_event(&self, request: &InsertEventRequest) -> Result<RawCalendarEvent>;
}
