//! Normalized calendar change events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Classification of a remote change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
}

impl_domain_status_conversions!(ChangeType {
    Create => "create",
    Update => "update",
    Delete => "delete",
});

/// Where a board reference was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Structured private extended properties on the event.
    Metadata,
    /// Tags embedded in the free-text description.
    Description,
}

/// Pointer from a calendar event back to the board item that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardReference {
    pub item_id: u64,
    pub board_id: Option<u64>,
    pub user_id: Option<String>,
    pub source: ReferenceSource,
}

/// One remote change after normalization.
///
/// The change type is derived from the provider payload when the event is
/// built (see [`crate::utils::event_mapper`]) and is read-only afterwards.
/// Events serialize for logging and hand-off but never deserialize, so the
/// only way to obtain one is [`crate::normalize_event`]:
///
/// ```compile_fail
/// fn deserializable<T: serde::de::DeserializeOwned>() {}
/// deserializable::<boardsync_domain::DomainEvent>();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainEvent {
    pub source_event_id: String,
    pub(crate) change_type: ChangeType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub assignee: Option<String>,
    pub board_ref: Option<BoardReference>,
}

impl DomainEvent {
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// Board item id, when the event links back to one.
    pub fn item_id(&self) -> Option<u64> {
        self.board_ref.as_ref().map(|reference| reference.item_id)
    }
}
