//! Calendar event normalizer.
//!
//! Turns a raw change-feed event into a [`DomainEvent`]: classifies the
//! change, resolves who the event belongs to, and recovers the board item
//! the event was created from. Parsing fails closed: anything malformed is
//! treated as absent rather than reported as an error.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{
    CANCELLED_STATUS, CREATE_TOLERANCE_MS, METADATA_BOARD_ID_KEY, METADATA_ITEM_ID_KEY,
    METADATA_USER_ID_KEY,
};
use crate::types::calendar::{EventDateTime, RawCalendarEvent};
use crate::types::event::{BoardReference, ChangeType, DomainEvent, ReferenceSource};

static ITEM_ID_TAG: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)monday-item-id:\s*(\d+)").ok());
static BOARD_ID_TAG: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)monday-board-id:\s*(\d+)").ok());

const ITEM_ID_KEYS: [&str; 2] = [METADATA_ITEM_ID_KEY, "mondayItemId"];
const BOARD_ID_KEYS: [&str; 2] = [METADATA_BOARD_ID_KEY, "mondayBoardId"];
const USER_ID_KEY: &str = METADATA_USER_ID_KEY;

/// Normalize a provider event.
pub fn normalize_event(raw: &RawCalendarEvent) -> DomainEvent {
    DomainEvent {
        source_event_id: raw.id.clone(),
        change_type: classify_change(raw),
        title: raw.summary.clone(),
        description: raw.description.clone(),
        start_time: raw.start.as_ref().and_then(parse_event_time),
        end_time: raw.end.as_ref().and_then(parse_event_time),
        assignee: resolve_assignee(raw),
        board_ref: resolve_board_reference(raw),
    }
}

/// Cancelled events are deletes. Otherwise an event whose `created` and
/// `updated` stamps sit within the tolerance window (or either is missing)
/// is a create, anything else an update.
pub fn classify_change(raw: &RawCalendarEvent) -> ChangeType {
    if raw.status.as_deref() == Some(CANCELLED_STATUS) {
        return ChangeType::Delete;
    }

    let created = raw.created.as_deref().and_then(parse_timestamp);
    let updated = raw.updated.as_deref().and_then(parse_timestamp);

    match (created, updated) {
        (Some(created), Some(updated)) => {
            let diff_ms = (updated - created).num_milliseconds().abs();
            if diff_ms <= CREATE_TOLERANCE_MS {
                ChangeType::Create
            } else {
                ChangeType::Update
            }
        }
        _ => ChangeType::Create,
    }
}

/// Owner metadata, then creator, organizer and first attendee.
pub fn resolve_assignee(raw: &RawCalendarEvent) -> Option<String> {
    let owner = raw.private_properties().and_then(|props| props.get(USER_ID_KEY)).cloned();

    owner
        .into_iter()
        .chain(raw.creator.as_ref().and_then(|person| person.email.clone()))
        .chain(raw.organizer.as_ref().and_then(|person| person.email.clone()))
        .chain(raw.attendees.first().and_then(|person| person.email.clone()))
        .find(|candidate| !candidate.trim().is_empty())
}

/// Structured metadata wins over description tags.
pub fn resolve_board_reference(raw: &RawCalendarEvent) -> Option<BoardReference> {
    let props = raw.private_properties();
    let lookup = |keys: &[&str]| {
        props.and_then(|props| keys.iter().find_map(|key| props.get(*key).and_then(|v| parse_id(v))))
    };

    let metadata_item = lookup(&ITEM_ID_KEYS);
    let metadata_board = lookup(&BOARD_ID_KEYS);
    let user_id = props.and_then(|props| props.get(USER_ID_KEY)).filter(|v| !v.is_empty()).cloned();

    let description = raw.description.as_deref().unwrap_or_default();

    let (item_id, source) = match metadata_item {
        Some(item_id) => (item_id, ReferenceSource::Metadata),
        None => (extract_tag(&ITEM_ID_TAG, description)?, ReferenceSource::Description),
    };

    let board_id = metadata_board.or_else(|| extract_tag(&BOARD_ID_TAG, description));

    Some(BoardReference { item_id, board_id, user_id, source })
}

fn extract_tag(pattern: &Lazy<Option<Regex>>, text: &str) -> Option<u64> {
    let regex = pattern.as_ref()?;
    let captures = regex.captures(text)?;
    parse_id(captures.get(1)?.as_str())
}

/// Board ids are positive integers.
fn parse_id(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|id| *id > 0)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Timed events use `dateTime`; all-day events start at UTC midnight.
fn parse_event_time(value: &EventDateTime) -> Option<DateTime<Utc>> {
    if let Some(date_time) = value.date_time.as_deref() {
        return parse_timestamp(date_time);
    }
    let date = NaiveDate::parse_from_str(value.date.as_deref()?, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::calendar::{EventPerson, ExtendedProperties};

    fn person(email: &str) -> EventPerson {
        EventPerson { email: Some(email.to_string()), display_name: None }
    }

    fn with_private(pairs: &[(&str, &str)]) -> Option<ExtendedProperties> {
        let private: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Some(ExtendedProperties { private, shared: HashMap::new() })
    }

    fn timed(created: &str, updated: &str) -> RawCalendarEvent {
        RawCalendarEvent {
            id: "evt".into(),
            status: Some("confirmed".into()),
            created: Some(created.into()),
            updated: Some(updated.into()),
            ..Default::default()
        }
    }

    #[test]
    fn cancelled_is_delete_regardless_of_timestamps() {
        let mut raw = timed("2024-01-01T10:00:00Z", "2024-01-01T10:00:00Z");
        raw.status = Some("cancelled".into());
        assert_eq!(classify_change(&raw), ChangeType::Delete);
    }

    #[test]
    fn close_timestamps_are_create() {
        let raw = timed("2024-01-01T10:00:00.000Z", "2024-01-01T10:00:02.000Z");
        assert_eq!(classify_change(&raw), ChangeType::Create);
    }

    #[test]
    fn distant_timestamps_are_update() {
        let raw = timed("2024-01-01T10:00:00.000Z", "2024-01-01T10:00:02.001Z");
        assert_eq!(classify_change(&raw), ChangeType::Update);
    }

    #[test]
    fn missing_or_bad_timestamp_is_create() {
        let mut raw = timed("2024-01-01T10:00:00Z", "2024-03-01T10:00:00Z");
        raw.updated = None;
        assert_eq!(classify_change(&raw), ChangeType::Create);

        raw.updated = Some("yesterday".into());
        assert_eq!(classify_change(&raw), ChangeType::Create);
    }

    #[test]
    fn assignee_follows_priority_order() {
        let mut raw = RawCalendarEvent {
            creator: Some(person("creator@example.com")),
            organizer: Some(person("organizer@example.com")),
            attendees: vec![person("first@example.com"), person("second@example.com")],
            extended_properties: with_private(&[("userId", "77")]),
            ..Default::default()
        };
        assert_eq!(resolve_assignee(&raw).as_deref(), Some("77"));

        raw.extended_properties = None;
        assert_eq!(resolve_assignee(&raw).as_deref(), Some("creator@example.com"));

        raw.creator = Some(EventPerson::default());
        assert_eq!(resolve_assignee(&raw).as_deref(), Some("organizer@example.com"));

        raw.organizer = None;
        assert_eq!(resolve_assignee(&raw).as_deref(), Some("first@example.com"));

        raw.attendees.clear();
        assert_eq!(resolve_assignee(&raw), None);
    }

    #[test]
    fn metadata_reference_wins_over_description() {
        let raw = RawCalendarEvent {
            description: Some("monday-item-id: 99".into()),
            extended_properties: with_private(&[
                ("mondayItemId", "42"),
                ("boardId", "7"),
                ("userId", "u-1"),
            ]),
            ..Default::default()
        };

        let reference = resolve_board_reference(&raw).unwrap();
        assert_eq!(reference.item_id, 42);
        assert_eq!(reference.board_id, Some(7));
        assert_eq!(reference.user_id.as_deref(), Some("u-1"));
        assert_eq!(reference.source, ReferenceSource::Metadata);
    }

    #[test]
    fn description_tags_are_a_fallback() {
        let raw = RawCalendarEvent {
            description: Some("Sprint review\nMONDAY-ITEM-ID: 1234\nmonday-board-id:55".into()),
            ..Default::default()
        };

        let reference = resolve_board_reference(&raw).unwrap();
        assert_eq!(reference.item_id, 1234);
        assert_eq!(reference.board_id, Some(55));
        assert_eq!(reference.source, ReferenceSource::Description);
    }

    #[test]
    fn malformed_metadata_fails_closed() {
        let raw = RawCalendarEvent {
            description: Some("no tags here".into()),
            extended_properties: with_private(&[("itemId", "abc"), ("mondayItemId", "0")]),
            ..Default::default()
        };
        assert_eq!(resolve_board_reference(&raw), None);
    }

    #[test]
    fn normalize_parses_all_day_and_timed_windows() {
        let raw = RawCalendarEvent {
            id: "evt-9".into(),
            summary: Some("Planning".into()),
            start: Some(EventDateTime { date: Some("2024-05-02".into()), ..Default::default() }),
            end: Some(EventDateTime {
                date_time: Some("2024-05-02T12:30:00+02:00".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let event = normalize_event(&raw);
        assert_eq!(event.source_event_id, "evt-9");
        assert_eq!(event.change_type(), ChangeType::Create);
        assert_eq!(event.start_time.unwrap().to_rfc3339(), "2024-05-02T00:00:00+00:00");
        assert_eq!(event.end_time.unwrap().to_rfc3339(), "2024-05-02T10:30:00+00:00");
        assert_eq!(event.title.as_deref(), Some("Planning"));
        assert!(event.board_ref.is_none());
    }
}
