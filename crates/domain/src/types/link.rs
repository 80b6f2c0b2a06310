//! Board items scheduled onto a calendar

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EVENT_TIME_ZONE, DEFAULT_EVENT_UTC_OFFSET};

/// A board item that should appear as a calendar event.
///
/// Start and end are free text as board date columns produce them; see
/// [`crate::utils::datetime::normalize_date_time`] for the accepted forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub item_id: u64,
    #[serde(default)]
    pub board_id: Option<u64>,
    /// Board user that owns the item.
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub attendee_email: Option<String>,
}

/// Zone stamped on created events. Local times without an offset are read
/// at `utc_offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventZone {
    pub time_zone: String,
    pub utc_offset: String,
}

impl Default for EventZone {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_EVENT_TIME_ZONE.to_string(),
            utc_offset: DEFAULT_EVENT_UTC_OFFSET.to_string(),
        }
    }
}
