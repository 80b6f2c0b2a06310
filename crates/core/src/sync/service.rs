//! Calendar sync service - the body of a webhook-triggered sync task

use std::sync::Arc;

use boardsync_domain::{QueueKey, Result};
use tracing::{info, instrument, warn};

use super::credentials::CalendarCredentialStore;
use super::cursor::SyncCursorStore;
use super::feed::ChangeFeedClient;
use crate::dispatch::{DispatchReport, EventDispatcher};

/// Summary of one sync run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncRunReport {
    pub events: usize,
    pub full_sync: bool,
    pub cursor_updated: bool,
    pub dispatch: DispatchReport,
    /// Set when the run ended early because a precondition was missing.
    pub skipped_reason: Option<String>,
}

impl SyncRunReport {
    fn skipped(reason: impl Into<String>) -> Self {
        Self { skipped_reason: Some(reason.into()), ..Self::default() }
    }
}

/// Runs incremental syncs and hands the resulting events to the dispatcher
pub struct CalendarSyncService {
    credentials: CalendarCredentialStore,
    cursors: SyncCursorStore,
    feed: ChangeFeedClient,
    dispatcher: EventDispatcher,
}

impl CalendarSyncService {
    pub fn new(
        credentials: CalendarCredentialStore,
        cursors: SyncCursorStore,
        feed: ChangeFeedClient,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self { credentials, cursors, feed, dispatcher }
    }

    /// Sync the calendar named by `key` and dispatch what changed.
    ///
    /// Must only be called from the serial queue for `key`: the cursor is
    /// read, then written, without any compare-and-swap.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn run(&self, key: &QueueKey) -> Result<SyncRunReport> {
        let Some(credentials) = self.credentials.get(&key.subject_id).await? else {
            warn!(subject_id = %key.subject_id, "no calendar credentials, skipping sync");
            return Ok(SyncRunReport::skipped("no calendar credentials"));
        };

        let cursor = self.cursors.get(&key.subject_id, &key.resource_id).await?;
        let outcome = self
            .feed
            .sync(&key.resource_id, &credentials.access_token, cursor.as_deref())
            .await?;

        let cursor_updated = match outcome.next_cursor.as_deref() {
            Some(next) if !next.is_empty() => {
                self.cursors.set(&key.subject_id, &key.resource_id, next).await?;
                true
            }
            _ => false,
        };

        let dispatch = self.dispatcher.dispatch(&outcome.events, key.account_id.as_deref()).await;

        info!(
            events = outcome.events.len(),
            full_sync = outcome.full_sync,
            cursor_updated,
            "sync run complete"
        );

        Ok(SyncRunReport {
            events: outcome.events.len(),
            full_sync: outcome.full_sync,
            cursor_updated,
            dispatch,
            skipped_reason: None,
        })
    }

    /// Full sync that only seeds the cursor. Events are not dispatched.
    ///
    /// Writes the same cursor as [`Self::run`], so it must be queued under
    /// the same key.
    #[instrument(skip(self, access_token))]
    pub async fn bootstrap(
        &self,
        subject_id: &str,
        calendar_id: &str,
        access_token: &str,
    ) -> Result<usize> {
        let outcome = self.feed.sync(calendar_id, access_token, None).await?;
        match outcome.next_cursor.as_deref() {
            Some(next) if !next.is_empty() => {
                self.cursors.set(subject_id, calendar_id, next).await?;
            }
            _ => warn!(calendar_id, "bootstrap sync returned no cursor"),
        }
        info!(events = outcome.events.len(), "bootstrap sync complete");
        Ok(outcome.events.len())
    }
}
