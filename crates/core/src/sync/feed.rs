//! Change feed client
//!
//! Fetches every page of changes since a cursor (or everything, without
//! one), normalizes the events and returns the continuation cursor for the
//! caller to persist. A cursor the provider rejects is dropped and the call
//! is repeated once as a full sync; a second rejection is fatal.

use std::sync::Arc;

use boardsync_common::resilience::{RetryConfig, RetryExecutor};
use boardsync_domain::{normalize_event, BoardSyncError, ChangeRequest, DomainEvent, Result};
use tracing::{debug, info, instrument, warn};

use crate::calendar_ports::ChangeFeedProvider;
use crate::resilience::{into_domain_error, TransientOnly};

/// Result of one sync call
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub events: Vec<DomainEvent>,
    /// Cursor for the next incremental sync, as returned by the provider.
    pub next_cursor: Option<String>,
    /// Whether the events come from a full listing rather than a delta.
    pub full_sync: bool,
}

/// Cursor-based client over a [`ChangeFeedProvider`]
pub struct ChangeFeedClient {
    provider: Arc<dyn ChangeFeedProvider>,
    retry: RetryExecutor<TransientOnly>,
}

impl ChangeFeedClient {
    pub fn new(provider: Arc<dyn ChangeFeedProvider>, retry: RetryConfig) -> Self {
        Self { provider, retry: RetryExecutor::new(retry, TransientOnly) }
    }

    /// Sync `calendar_id`, incrementally when `cursor` is given.
    #[instrument(skip(self, access_token, cursor), fields(incremental = cursor.is_some()))]
    pub async fn sync(
        &self,
        calendar_id: &str,
        access_token: &str,
        cursor: Option<&str>,
    ) -> Result<SyncOutcome> {
        match self.fetch_all(calendar_id, access_token, cursor).await {
            Err(err) if err.is_cursor_invalidated() && cursor.is_some() => {
                warn!(calendar_id, error = %err, "sync cursor rejected, falling back to full sync");
                match self.fetch_all(calendar_id, access_token, None).await {
                    Err(err) if err.is_cursor_invalidated() => {
                        Err(BoardSyncError::CursorInvalidated(format!(
                            "full resync of {calendar_id} was rejected after cursor fallback: {err}"
                        )))
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn fetch_all(
        &self,
        calendar_id: &str,
        access_token: &str,
        cursor: Option<&str>,
    ) -> Result<SyncOutcome> {
        let mut events = Vec::new();
        let mut next_cursor = None;
        let mut page_token: Option<String> = None;
        let mut pages = 0_usize;

        loop {
            let request = ChangeRequest {
                calendar_id,
                access_token,
                sync_token: cursor,
                page_token: page_token.as_deref(),
            };
            let page = self
                .retry
                .execute(|| self.provider.list_changes(request))
                .await
                .map_err(into_domain_error)?;
            pages += 1;

            debug!(calendar_id, page = pages, items = page.items.len(), "fetched change page");
            events.extend(page.items.iter().map(normalize_event));

            if page.next_sync_token.is_some() {
                next_cursor = page.next_sync_token;
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    if page_token.as_deref() == Some(token.as_str()) {
                        return Err(BoardSyncError::Remote(format!(
                            "change feed for {calendar_id} repeated page token"
                        )));
                    }
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        info!(calendar_id, events = events.len(), pages, "change feed synced");
        Ok(SyncOutcome { events, next_cursor, full_sync: cursor.is_none() })
    }
}
