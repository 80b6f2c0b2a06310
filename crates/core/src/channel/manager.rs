//! Push channel lifecycle
//!
//! Opens a watch on a calendar, remembers it under `calendar-channel:{subject}`
//! and closes it again. Provider registration is attempted once; failures are
//! logged and reported as `None` so callers can decide whether to retry.

use std::sync::Arc;

use boardsync_domain::constants::{CHANNEL_ID_PREFIX, CHANNEL_KEY_PREFIX};
use boardsync_domain::{ChannelContext, ChannelRegistration, Result, WatchRequest};
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::calendar_ports::ChangeFeedProvider;
use crate::storage_ports::KeyValueStore;

pub fn channel_key(subject_id: &str) -> String {
    format!("{CHANNEL_KEY_PREFIX}:{subject_id}")
}

/// Channel id for `subject_id` at `timestamp_ms`, restricted to
/// `[A-Za-z0-9_-]`.
pub fn channel_id(subject_id: &str, timestamp_ms: i64) -> String {
    let raw = format!("{CHANNEL_ID_PREFIX}-{subject_id}-{timestamp_ms}");
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Owns channel registrations for all subjects
pub struct ChannelManager {
    provider: Arc<dyn ChangeFeedProvider>,
    store: Arc<dyn KeyValueStore>,
    webhook_url: String,
}

impl ChannelManager {
    pub fn new(
        provider: Arc<dyn ChangeFeedProvider>,
        store: Arc<dyn KeyValueStore>,
        webhook_url: impl Into<String>,
    ) -> Self {
        Self { provider, store, webhook_url: webhook_url.into() }
    }

    /// Watch `calendar_id` on behalf of `context`.
    #[instrument(skip(self, access_token, context), fields(subject_id = %context.subject_id))]
    pub async fn connect(
        &self,
        context: &ChannelContext,
        calendar_id: &str,
        access_token: &str,
    ) -> Option<ChannelRegistration> {
        let token = match context.encode() {
            Ok(token) => token,
            Err(err) => {
                error!(error = %err, "could not encode channel context");
                return None;
            }
        };

        let request = WatchRequest {
            calendar_id: calendar_id.to_string(),
            access_token: access_token.to_string(),
            channel_id: channel_id(&context.subject_id, Utc::now().timestamp_millis()),
            address: self.webhook_url.clone(),
            token,
        };

        let response = match self.provider.watch(&request).await {
            Ok(response) => response,
            Err(err) => {
                error!(calendar_id, channel_id = %request.channel_id, error = %err, "watch failed");
                return None;
            }
        };

        let registration = ChannelRegistration {
            channel_id: response.channel_id,
            resource_id: response.resource_id,
            calendar_id: calendar_id.to_string(),
            subject_id: context.subject_id.clone(),
            expiration: response.expiration,
        };

        if let Err(err) = self.save(&registration).await {
            error!(channel_id = %registration.channel_id, error = %err, "could not persist channel");
            return None;
        }

        info!(
            channel_id = %registration.channel_id,
            expires_at = ?registration.expires_at(),
            "calendar watch established"
        );
        Some(registration)
    }

    /// Stop the subject's channel and forget it. `Ok(false)` when there was
    /// nothing registered.
    #[instrument(skip(self, access_token))]
    pub async fn disconnect(&self, subject_id: &str, access_token: Option<&str>) -> Result<bool> {
        let Some(registration) = self.registration(subject_id).await? else {
            return Ok(false);
        };

        match access_token {
            Some(token) => {
                if let Err(err) = self
                    .provider
                    .stop(token, &registration.channel_id, &registration.resource_id)
                    .await
                {
                    warn!(channel_id = %registration.channel_id, error = %err, "stop channel failed");
                }
            }
            None => warn!(channel_id = %registration.channel_id, "no credentials to stop channel"),
        }

        self.store.delete(&channel_key(subject_id)).await?;
        info!(channel_id = %registration.channel_id, "calendar watch removed");
        Ok(true)
    }

    /// Stored registration for `subject_id`; unreadable entries read as absent.
    pub async fn registration(&self, subject_id: &str) -> Result<Option<ChannelRegistration>> {
        let Some(raw) = self.store.get(&channel_key(subject_id)).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(registration) => Ok(Some(registration)),
            Err(err) => {
                warn!(subject_id, error = %err, "stored channel registration is unreadable");
                Ok(None)
            }
        }
    }

    async fn save(&self, registration: &ChannelRegistration) -> Result<()> {
        let json = serde_json::to_string(registration)?;
        self.store.set(&channel_key(&registration.subject_id), &json).await
    }
}
