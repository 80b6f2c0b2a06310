//! Sync cursor persistence
//!
//! One opaque continuation token per (subject, calendar). Tokens are stored
//! verbatim; an empty value reads back as "no cursor".

use std::sync::Arc;

use boardsync_domain::constants::SYNC_CURSOR_KEY_PREFIX;
use boardsync_domain::Result;
use tracing::debug;

use crate::storage_ports::KeyValueStore;

/// Storage key for a subject's cursor on one calendar.
pub fn cursor_key(subject_id: &str, resource_id: &str) -> String {
    format!("{SYNC_CURSOR_KEY_PREFIX}:{subject_id}:{resource_id}")
}

/// Reads and writes sync cursors through a [`KeyValueStore`]
#[derive(Clone)]
pub struct SyncCursorStore {
    store: Arc<dyn KeyValueStore>,
}

impl SyncCursorStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, subject_id: &str, resource_id: &str) -> Result<Option<String>> {
        let raw = self.store.get(&cursor_key(subject_id, resource_id)).await?;
        Ok(raw.and_then(|value| decode_cursor(&value)))
    }

    pub async fn set(&self, subject_id: &str, resource_id: &str, token: &str) -> Result<()> {
        debug!(subject_id, resource_id, "persisting sync cursor");
        self.store.set(&cursor_key(subject_id, resource_id), token).await
    }
}

/// Accept both a bare token and a JSON string literal.
fn decode_cursor(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let token = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).ok()?
    } else {
        trimmed.to_string()
    };
    (!token.is_empty()).then_some(token)
}
