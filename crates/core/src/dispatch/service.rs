//! Domain event dispatcher
//!
//! Routes every normalized event to the handler for its change type. Deletes
//! become `delete_item` mutations on the board platform; they run through
//! the batch runner so each one is retried on its own and one failing item
//! never blocks the rest. Creates and updates have no board-side effect yet
//! and are reported as deferred.
//!
//! Missing preconditions (no board reference, no account, no token) are
//! logged and counted as skipped. Dispatch itself never fails.

use std::sync::Arc;

use boardsync_common::resilience::{BatchConfig, BatchRunner};
use boardsync_domain::{BoardMutation, BoardSyncError, ChangeType, DomainEvent, Result};
use tracing::{debug, info, instrument, warn};

use crate::board_ports::{AuthProvider, BoardClient};
use crate::resilience::{into_domain_error, TransientOnly};

/// What happened to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// No board-side handling exists for this change type yet.
    Deferred,
    /// Scheduled for a `delete_item` mutation.
    PendingDelete(u64),
    Skipped(String),
}

/// Counts per outcome for one dispatch call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub created_deferred: usize,
    pub updated_deferred: usize,
    pub deleted: Vec<u64>,
    pub skipped: usize,
    pub failed: Vec<(u64, String)>,
}

impl DispatchReport {
    pub fn total_handled(&self) -> usize {
        self.created_deferred
            + self.updated_deferred
            + self.deleted.len()
            + self.skipped
            + self.failed.len()
    }
}

/// Dispatches change events to board mutations
pub struct EventDispatcher {
    auth: Arc<dyn AuthProvider>,
    board: Arc<dyn BoardClient>,
    runner: BatchRunner<TransientOnly>,
    fallback_token: Option<String>,
}

impl EventDispatcher {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        board: Arc<dyn BoardClient>,
        batch: BatchConfig,
    ) -> Self {
        Self { auth, board, runner: BatchRunner::new(batch, TransientOnly), fallback_token: None }
    }

    /// Static token used when the account has no stored token. Only wire
    /// this from an explicit opt-in setting.
    pub fn with_fallback_token(mut self, token: Option<String>) -> Self {
        self.fallback_token = token.filter(|token| !token.is_empty());
        self
    }

    /// Handle every event in `events` for `account_id`.
    #[instrument(skip(self, events), fields(events = events.len()))]
    pub async fn dispatch(&self, events: &[DomainEvent], account_id: Option<&str>) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut deletions = Vec::new();

        for event in events {
            let disposition = match event.change_type() {
                ChangeType::Create => self.on_created(event),
                ChangeType::Update => self.on_updated(event),
                ChangeType::Delete => self.on_deleted(event, account_id),
            };

            match (event.change_type(), disposition) {
                (ChangeType::Create, EventDisposition::Deferred) => report.created_deferred += 1,
                (ChangeType::Update, EventDisposition::Deferred) => report.updated_deferred += 1,
                (_, EventDisposition::PendingDelete(item_id)) => deletions.push(item_id),
                (_, EventDisposition::Skipped(reason)) => {
                    debug!(event_id = %event.source_event_id, reason = %reason, "event skipped");
                    report.skipped += 1;
                }
                (_, EventDisposition::Deferred) => report.skipped += 1,
            }
        }

        if deletions.is_empty() {
            return report;
        }

        // `on_deleted` only schedules deletions when an account is present.
        let Some(account_id) = account_id else {
            report.skipped += deletions.len();
            return report;
        };

        let Some(token) = self.resolve_access_token(account_id).await else {
            warn!(
                account_id,
                pending = deletions.len(),
                "no access token for account, skipping deletions"
            );
            report.skipped += deletions.len();
            return report;
        };

        self.delete_items(deletions, &token, &mut report).await;
        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            skipped = report.skipped,
            "dispatch finished"
        );
        report
    }

    /// Extension point for newly created calendar events.
    pub fn on_created(&self, event: &DomainEvent) -> EventDisposition {
        debug!(event_id = %event.source_event_id, "create has no board handler");
        EventDisposition::Deferred
    }

    /// Extension point for updated calendar events.
    pub fn on_updated(&self, event: &DomainEvent) -> EventDisposition {
        debug!(event_id = %event.source_event_id, "update has no board handler");
        EventDisposition::Deferred
    }

    fn on_deleted(&self, event: &DomainEvent, account_id: Option<&str>) -> EventDisposition {
        let Some(item_id) = event.item_id() else {
            return EventDisposition::Skipped("event has no board item reference".into());
        };
        if account_id.map_or(true, str::is_empty) {
            warn!(event_id = %event.source_event_id, item_id, "delete without account, skipping");
            return EventDisposition::Skipped("no account for board mutation".into());
        }
        EventDisposition::PendingDelete(item_id)
    }

    /// Stored token first, then the configured fallback.
    async fn resolve_access_token(&self, account_id: &str) -> Option<String> {
        match self.auth.get_access_token(account_id).await {
            Ok(Some(token)) if !token.access_token.is_empty() => return Some(token.access_token),
            Ok(_) => debug!(account_id, "no stored access token"),
            Err(err) => warn!(account_id, error = %err, "access token lookup failed"),
        }

        if self.fallback_token.is_some() {
            warn!(account_id, "using local fallback access token");
        }
        self.fallback_token.clone()
    }

    async fn delete_items(&self, item_ids: Vec<u64>, token: &str, report: &mut DispatchReport) {
        let board = &self.board;
        let summary = self
            .runner
            .run(item_ids.clone(), |item_id, _| async move {
                let outcome = board.mutate(token, &BoardMutation::delete_item(item_id)).await?;
                ensure_success(item_id, outcome.success, outcome.errors.as_ref())
            })
            .await;

        for result in summary.results {
            let Some(item_id) = item_ids.get(result.index).copied() else {
                continue;
            };
            match result.result {
                Ok(()) => report.deleted.push(item_id),
                Err(err) => {
                    let err = into_domain_error(err);
                    warn!(item_id, attempts = result.attempts, error = %err, "delete_item failed");
                    report.failed.push((item_id, err.to_string()));
                }
            }
        }
    }
}

fn ensure_success(item_id: u64, success: bool, errors: Option<&serde_json::Value>) -> Result<()> {
    if success {
        return Ok(());
    }
    let detail = errors.map(ToString::to_string).unwrap_or_else(|| "no error details".into());
    Err(BoardSyncError::Remote(format!("delete_item({item_id}) rejected: {detail}")))
}
