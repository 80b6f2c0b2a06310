//! Push channel registrations and the context token they carry

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{BoardSyncError, Result};

/// An active watch on one calendar, stored under `calendar-channel:{subject}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRegistration {
    pub channel_id: String,
    pub resource_id: String,
    pub calendar_id: String,
    pub subject_id: String,
    /// Epoch milliseconds; `None` when the provider did not report one.
    pub expiration: Option<i64>,
}

impl ChannelRegistration {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiration.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expiry| expiry <= now)
    }
}

/// Caller context echoed back by the provider on every notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContext {
    pub subject_id: String,
    #[serde(default)]
    pub account_id: Option<String>,
}

impl ChannelContext {
    pub fn new(subject_id: impl Into<String>, account_id: Option<String>) -> Self {
        Self { subject_id: subject_id.into(), account_id }
    }

    /// URL-safe base64 of the JSON form.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| BoardSyncError::InvalidInput(format!("channel token is not base64: {e}")))?;
        let context: Self = serde_json::from_slice(&bytes)?;
        if context.subject_id.is_empty() {
            return Err(BoardSyncError::InvalidInput("channel token has no subject".into()));
        }
        Ok(context)
    }
}
