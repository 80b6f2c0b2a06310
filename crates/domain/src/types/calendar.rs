//! Calendar provider wire shapes
//!
//! These mirror the JSON the change feed returns. Every field the provider
//! may omit is optional so that parsing never fails on sparse events.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One event as returned by the change feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalendarEvent {
    #[serde(default)]
    pub id: String,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    /// RFC 3339 creation timestamp.
    pub created: Option<String>,
    /// RFC 3339 last-modification timestamp.
    pub updated: Option<String>,
    pub creator: Option<EventPerson>,
    pub organizer: Option<EventPerson>,
    #[serde(default)]
    pub attendees: Vec<EventPerson>,
    pub extended_properties: Option<ExtendedProperties>,
}

impl RawCalendarEvent {
    /// Private extended properties, empty when the event carries none.
    pub fn private_properties(&self) -> Option<&HashMap<String, String>> {
        self.extended_properties.as_ref().map(|props| &props.private)
    }
}

/// Timed events carry `dateTime`; all-day events carry `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPerson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(default)]
    pub private: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub shared: HashMap<String, String>,
}

/// One page of the change feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePage {
    #[serde(default)]
    pub items: Vec<RawCalendarEvent>,
    pub next_page_token: Option<String>,
    /// Present only on the last page of a listing.
    pub next_sync_token: Option<String>,
}

/// Parameters of a single change-feed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRequest<'a> {
    pub calendar_id: &'a str,
    pub access_token: &'a str,
    pub sync_token: Option<&'a str>,
    pub page_token: Option<&'a str>,
}

/// Parameters for opening a push channel on a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRequest {
    pub calendar_id: String,
    pub access_token: String,
    pub channel_id: String,
    pub address: String,
    /// Opaque token echoed back on every notification for the channel.
    pub token: String,
}

/// Provider acknowledgement of a push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchResponse {
    #[serde(rename = "id")]
    pub channel_id: String,
    pub resource_id: String,
    /// Expiration as epoch milliseconds.
    #[serde(default, deserialize_with = "deserialize_expiration")]
    pub expiration: Option<i64>,
}

/// Google reports `expiration` as a decimal string; accept numbers too.
fn deserialize_expiration<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Body of an event insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(default)]
    pub attendees: Vec<EventPerson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
}

/// Parameters for creating an event on a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertEventRequest {
    pub calendar_id: String,
    pub access_token: String,
    pub event: NewCalendarEvent,
}

/// OAuth credentials for a subject's calendar account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCredentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry as epoch milliseconds.
    #[serde(default)]
    pub expiry_date: Option<i64>,
}
