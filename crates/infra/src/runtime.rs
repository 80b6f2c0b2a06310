//! Runtime wiring
//!
//! Builds every adapter and service from an [`AppConfig`] and exposes the
//! entry points a host needs: webhook delivery, calendar connect and
//! disconnect, and linking board items onto a calendar.

use std::sync::Arc;
use std::time::Duration;

use boardsync_common::KeyedSerialQueue;
use boardsync_core::resilience::{batch_config, retry_config};
use boardsync_core::{
    CalendarCredentialStore, CalendarSyncService, ChangeFeedClient, ChangeFeedProvider,
    ChannelManager, EventDispatcher, EventLinkService, KeyValueStore, SyncCursorStore, WebhookAck,
    WebhookIngress,
};
use boardsync_domain::{
    AppConfig, BoardSyncError, CalendarCredentials, ChannelContext, ChannelRegistration,
    QueueKey, RawCalendarEvent, Result, ScheduledItem, WebhookNotification,
};
use tracing::{info, instrument, warn};

use crate::auth::StoredTokenProvider;
use crate::http::HttpClient;
use crate::integrations::{GoogleCalendarFeed, MondayBoardClient};
use crate::storage::{MemoryKeyValueStore, SqliteKeyValueStore};

/// Fully wired sync pipeline
pub struct SyncRuntime {
    store: Arc<dyn KeyValueStore>,
    tokens: Arc<StoredTokenProvider>,
    credentials: CalendarCredentialStore,
    sync: Arc<CalendarSyncService>,
    channels: Arc<ChannelManager>,
    links: EventLinkService,
    queue: Arc<KeyedSerialQueue<QueueKey>>,
    ingress: WebhookIngress,
}

impl SyncRuntime {
    /// Build the runtime. Storage is SQLite when a path is configured and
    /// in-memory otherwise.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage.sqlite_path.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                Arc::new(SqliteKeyValueStore::open(path, config.storage.pool_size)?)
            }
            _ => {
                warn!("no sqlite path configured, state will not survive a restart");
                Arc::new(MemoryKeyValueStore::new())
            }
        };
        Self::with_store(config, store)
    }

    /// Build the runtime over an existing store.
    pub fn with_store(config: &AppConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        if config.google.webhook_url.trim().is_empty() {
            return Err(BoardSyncError::Config("google.webhook_url must be set".into()));
        }

        let http = HttpClient::new()?;
        let feed: Arc<dyn ChangeFeedProvider> =
            Arc::new(GoogleCalendarFeed::new(http.clone(), &config.google.api_base_url));
        let board = Arc::new(MondayBoardClient::new(http, &config.monday.api_url));
        let tokens = Arc::new(StoredTokenProvider::new(
            Arc::clone(&store),
            Duration::from_secs(config.auth.token_cache_ttl_secs),
        ));

        let dispatcher = EventDispatcher::new(
            tokens.clone(),
            board,
            batch_config(&config.batch, &config.retry),
        )
        .with_fallback_token(config.monday.fallback_token().map(str::to_string));

        let credentials = CalendarCredentialStore::new(Arc::clone(&store));
        let sync = Arc::new(CalendarSyncService::new(
            credentials.clone(),
            SyncCursorStore::new(Arc::clone(&store)),
            ChangeFeedClient::new(Arc::clone(&feed), retry_config(&config.retry)),
            dispatcher,
        ));
        let links =
            EventLinkService::new(Arc::clone(&feed), credentials.clone(), config.google.event_zone());
        let channels = Arc::new(ChannelManager::new(
            feed,
            Arc::clone(&store),
            config.google.webhook_url.clone(),
        ));
        let queue = Arc::new(KeyedSerialQueue::new());
        let ingress =
            WebhookIngress::new(Arc::clone(&queue), Arc::clone(&sync), Arc::clone(&channels));

        info!(
            google_api = %config.google.api_base_url,
            monday_api = %config.monday.api_url,
            local_token_fallback = config.monday.fallback_token().is_some(),
            "sync runtime ready"
        );

        Ok(Self { store, tokens, credentials, sync, channels, links, queue, ingress })
    }

    pub async fn handle_webhook(&self, notification: &WebhookNotification) -> Result<WebhookAck> {
        self.ingress.handle(notification).await
    }

    /// Store the subject's credentials, open a channel on `calendar_id` and
    /// seed its sync cursor. Returns once the seeding task has run.
    /// `Ok(None)` when the provider refused the watch.
    #[instrument(skip(self, credentials))]
    pub async fn connect_calendar(
        &self,
        subject_id: &str,
        account_id: Option<&str>,
        calendar_id: &str,
        credentials: &CalendarCredentials,
    ) -> Result<Option<ChannelRegistration>> {
        self.credentials.set(subject_id, credentials).await?;

        let context = ChannelContext::new(subject_id, account_id.map(str::to_string));
        let Some(registration) =
            self.channels.connect(&context, calendar_id, &credentials.access_token).await
        else {
            return Ok(None);
        };

        self.bootstrap(subject_id, account_id, calendar_id, &credentials.access_token).await;
        Ok(Some(registration))
    }

    /// Seed the cursor through the serial queue. The channel is already live,
    /// so a notification may be queued for the same key behind this task.
    async fn bootstrap(
        &self,
        subject_id: &str,
        account_id: Option<&str>,
        calendar_id: &str,
        access_token: &str,
    ) {
        let key = QueueKey::new(subject_id, calendar_id, account_id.map(str::to_string));
        let sync = Arc::clone(&self.sync);
        let (subject_id, calendar_id, access_token) =
            (subject_id.to_string(), calendar_id.to_string(), access_token.to_string());

        let task = self.queue.enqueue(key, move || async move {
            match sync.bootstrap(&subject_id, &calendar_id, &access_token).await {
                Ok(events) => info!(events, "initial sync stored cursor"),
                Err(err) => {
                    warn!(error = %err, "initial sync failed, first webhook will run a full sync");
                }
            }
            Ok::<(), BoardSyncError>(())
        });

        if let Err(err) = task.await {
            warn!(error = %err, "initial sync task did not complete");
        }
    }

    /// Put a board item on `calendar_id` as an event linked back to it.
    /// `Ok(None)` when the subject has no stored credentials.
    pub async fn link_board_item(
        &self,
        subject_id: &str,
        calendar_id: &str,
        item: &ScheduledItem,
    ) -> Result<Option<RawCalendarEvent>> {
        self.links.create_linked_event(subject_id, calendar_id, item).await
    }

    /// Stop and forget the subject's channel. `Ok(false)` when none exists.
    #[instrument(skip(self))]
    pub async fn disconnect_calendar(&self, subject_id: &str) -> Result<bool> {
        let credentials = self.credentials.get(subject_id).await?;
        let access_token = credentials.as_ref().map(|c| c.access_token.as_str());
        self.channels.disconnect(subject_id, access_token).await
    }

    pub fn tokens(&self) -> &StoredTokenProvider {
        &self.tokens
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Number of keys with queued or running sync work.
    pub fn pending_keys(&self) -> usize {
        self.queue.active_keys()
    }
}
