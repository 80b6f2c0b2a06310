//! Per-subject calendar credentials

use std::sync::Arc;

use boardsync_domain::constants::CALENDAR_CREDENTIALS_KEY_PREFIX;
use boardsync_domain::{CalendarCredentials, Result};
use tracing::warn;

use crate::storage_ports::KeyValueStore;

pub fn credentials_key(subject_id: &str) -> String {
    format!("{CALENDAR_CREDENTIALS_KEY_PREFIX}:{subject_id}")
}

/// Calendar OAuth credentials stored as JSON per subject
#[derive(Clone)]
pub struct CalendarCredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CalendarCredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Unreadable entries are reported as absent.
    pub async fn get(&self, subject_id: &str) -> Result<Option<CalendarCredentials>> {
        let Some(raw) = self.store.get(&credentials_key(subject_id)).await? else {
            return Ok(None);
        };

        let credentials = parse_credentials(&raw);
        if credentials.is_none() {
            warn!(subject_id, "stored calendar credentials are unreadable");
        }
        Ok(credentials)
    }

    pub async fn set(&self, subject_id: &str, credentials: &CalendarCredentials) -> Result<()> {
        let json = serde_json::to_string(credentials)?;
        self.store.set(&credentials_key(subject_id), &json).await
    }
}

/// Credentials may have been written as a JSON object or as a JSON string
/// containing the object.
fn parse_credentials(raw: &str) -> Option<CalendarCredentials> {
    if let Ok(credentials) = serde_json::from_str::<CalendarCredentials>(raw) {
        return Some(credentials);
    }
    let inner = serde_json::from_str::<String>(raw).ok()?;
    serde_json::from_str::<CalendarCredentials>(&inner).ok()
}
