//! Webhook ingress
//!
//! Validates provider notifications and turns "content changed" signals into
//! serialized sync tasks. Only a structurally invalid notification is an
//! error; every other case is acknowledged so the provider does not retry
//! the delivery.

use std::sync::Arc;

use boardsync_common::KeyedSerialQueue;
use boardsync_domain::{
    BoardSyncError, ChannelContext, QueueKey, ResourceState, Result, WebhookNotification,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::channel::ChannelManager;
use crate::sync::CalendarSyncService;

static CALENDAR_IN_URI: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"calendars/([^/]+)/events").ok());

/// Response to a delivered notification
#[derive(Debug)]
pub enum WebhookAck {
    /// Channel-opened handshake; nothing to do.
    Handshake,
    /// A sync task was queued under `key`.
    Accepted { key: QueueKey, task: JoinHandle<()> },
    /// Acknowledged without work.
    Ignored { reason: String },
}

impl WebhookAck {
    fn ignored(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!(reason = %reason, "notification ignored");
        Self::Ignored { reason }
    }
}

/// Calendar id embedded in a resource URI, percent-decoded.
pub fn calendar_id_from_uri(resource_uri: &str) -> Option<String> {
    let captures = CALENDAR_IN_URI.as_ref()?.captures(resource_uri)?;
    let encoded = captures.get(1)?.as_str();
    urlencoding::decode(encoded).ok().map(|decoded| decoded.into_owned())
}

/// Entry point for provider push notifications
pub struct WebhookIngress {
    queue: Arc<KeyedSerialQueue<QueueKey>>,
    sync: Arc<CalendarSyncService>,
    channels: Arc<ChannelManager>,
}

impl WebhookIngress {
    pub fn new(
        queue: Arc<KeyedSerialQueue<QueueKey>>,
        sync: Arc<CalendarSyncService>,
        channels: Arc<ChannelManager>,
    ) -> Self {
        Self { queue, sync, channels }
    }

    #[instrument(skip_all, fields(channel_id = ?notification.channel_id, state = ?notification.resource_state))]
    pub async fn handle(&self, notification: &WebhookNotification) -> Result<WebhookAck> {
        let channel_id = required(notification.channel_id.as_deref(), "channel id")?;
        required(notification.resource_id.as_deref(), "resource id")?;

        match notification.state() {
            Some(ResourceState::Sync) => {
                info!(channel_id, "channel handshake received");
                return Ok(WebhookAck::Handshake);
            }
            Some(ResourceState::Exists) => {}
            _ => return Ok(WebhookAck::ignored("resource state is not a content change")),
        }

        let Some(token) = notification.channel_token.as_deref() else {
            return Ok(WebhookAck::ignored("notification carries no channel token"));
        };
        let context = match ChannelContext::decode(token) {
            Ok(context) => context,
            Err(err) => {
                warn!(channel_id, error = %err, "undecodable channel token");
                return Ok(WebhookAck::ignored("undecodable channel token"));
            }
        };

        let Some(calendar_id) = self.resolve_calendar(notification, &context, channel_id).await
        else {
            return Ok(WebhookAck::ignored("could not determine calendar"));
        };

        let key = QueueKey::new(context.subject_id, calendar_id, context.account_id);
        let task = self.enqueue(key.clone());
        info!(key = %key, "sync task queued");
        Ok(WebhookAck::Accepted { key, task })
    }

    /// Resource URI first, then the stored registration for this channel.
    async fn resolve_calendar(
        &self,
        notification: &WebhookNotification,
        context: &ChannelContext,
        channel_id: &str,
    ) -> Option<String> {
        if let Some(calendar_id) =
            notification.resource_uri.as_deref().and_then(calendar_id_from_uri)
        {
            return Some(calendar_id);
        }

        match self.channels.registration(&context.subject_id).await {
            Ok(Some(registration)) if registration.channel_id == channel_id => {
                Some(registration.calendar_id)
            }
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "channel registration lookup failed");
                None
            }
        }
    }

    fn enqueue(&self, key: QueueKey) -> JoinHandle<()> {
        let sync = Arc::clone(&self.sync);
        let task_key = key.clone();
        self.queue.enqueue(key, move || async move {
            let report = sync.run(&task_key).await?;
            debug!(
                events = report.events,
                deleted = report.dispatch.deleted.len(),
                "queued sync finished"
            );
            Ok::<_, BoardSyncError>(())
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| BoardSyncError::InvalidInput(format!("notification is missing {field}")))
}
