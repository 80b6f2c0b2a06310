use std::fmt;

use serde::{Deserialize, Serialize};

/// Serialization key for webhook-triggered sync runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueKey {
    pub subject_id: String,
    pub resource_id: String,
    pub account_id: Option<String>,
}

impl QueueKey {
    pub fn new(
        subject_id: impl Into<String>,
        resource_id: impl Into<String>,
        account_id: Option<String>,
    ) -> Self {
        Self { subject_id: subject_id.into(), resource_id: resource_id.into(), account_id }
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.subject_id,
            self.resource_id,
            self.account_id.as_deref().unwrap_or("-")
        )
    }
}
