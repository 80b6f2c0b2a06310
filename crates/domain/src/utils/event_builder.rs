//! Calendar events created from board items.
//!
//! A created event carries its board back-reference twice: as private
//! extended properties and as tags appended to the description. The
//! normalizer reads the properties first and falls back to the tags, so the
//! link survives clients that strip extended properties.

use std::collections::HashMap;

use crate::constants::{
    BOARD_ID_TAG, ITEM_ID_TAG, METADATA_BOARD_ID_KEY, METADATA_ITEM_ID_KEY, METADATA_USER_ID_KEY,
};
use crate::errors::{BoardSyncError, Result};
use crate::types::calendar::{EventDateTime, EventPerson, ExtendedProperties, NewCalendarEvent};
use crate::types::link::{EventZone, ScheduledItem};
use crate::utils::datetime::normalize_date_time;

/// Build the insert body for `item`.
///
/// # Errors
/// `InvalidInput` when the item id is zero or either time matches no
/// accepted form.
pub fn build_linked_event(item: &ScheduledItem, zone: &EventZone) -> Result<NewCalendarEvent> {
    if item.item_id == 0 {
        return Err(BoardSyncError::InvalidInput("board item id must be positive".into()));
    }

    Ok(NewCalendarEvent {
        summary: item.title.clone(),
        description: tagged_description(item),
        start: event_time(&item.start_time, "start", zone)?,
        end: event_time(&item.end_time, "end", zone)?,
        attendees: item
            .attendee_email
            .iter()
            .filter(|email| !email.trim().is_empty())
            .map(|email| EventPerson { email: Some(email.trim().to_string()), display_name: None })
            .collect(),
        extended_properties: Some(ExtendedProperties {
            private: link_properties(item),
            shared: HashMap::new(),
        }),
    })
}

/// Private properties linking an event to `item`.
pub fn link_properties(item: &ScheduledItem) -> HashMap<String, String> {
    let mut props = HashMap::from([(METADATA_ITEM_ID_KEY.to_string(), item.item_id.to_string())]);
    if let Some(board_id) = item.board_id {
        props.insert(METADATA_BOARD_ID_KEY.to_string(), board_id.to_string());
    }
    if let Some(user_id) = item.user_id.as_deref().filter(|id| !id.trim().is_empty()) {
        props.insert(METADATA_USER_ID_KEY.to_string(), user_id.to_string());
    }
    props
}

fn tagged_description(item: &ScheduledItem) -> String {
    let mut lines: Vec<String> = item
        .description
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .into_iter()
        .collect();
    lines.push(format!("{ITEM_ID_TAG}: {}", item.item_id));
    if let Some(board_id) = item.board_id {
        lines.push(format!("{BOARD_ID_TAG}: {board_id}"));
    }
    lines.join("\n")
}

fn event_time(raw: &str, which: &str, zone: &EventZone) -> Result<EventDateTime> {
    let date_time = normalize_date_time(raw, &zone.utc_offset).ok_or_else(|| {
        BoardSyncError::InvalidInput(format!("unrecognized {which} time: {raw:?}"))
    })?;
    Ok(EventDateTime { date_time: Some(date_time), date: None, time_zone: Some(zone.time_zone.clone()) })
}
