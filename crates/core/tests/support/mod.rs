//! Shared test helpers for `boardsync-core` integration tests.
//!
//! Lightweight in-memory mocks for every port plus builders for raw
//! calendar events, so the scenario tests can focus on behaviour.

#![allow(dead_code)]

pub mod board;
pub mod calendar;
pub mod storage;

use std::collections::HashMap;
use std::time::Duration;

use boardsync_common::resilience::{BatchConfig, LinearBackoff, RetryConfig};
use boardsync_domain::{EventDateTime, ExtendedProperties, RawCalendarEvent};

pub use board::{MockAuthProvider, RecordingBoardClient};
pub use calendar::ScriptedFeedProvider;
pub use storage::InMemoryStore;

pub const CREATED_AT: &str = "2024-03-01T09:00:00Z";

/// Three attempts, linear 2s backoff. Pair with paused time.
pub fn retry_config() -> RetryConfig {
    RetryConfig { max_attempts: 3, backoff: LinearBackoff::new(Duration::from_secs(2)) }
}

pub fn batch_config() -> BatchConfig {
    BatchConfig {
        concurrency: 10,
        retry: retry_config(),
        inter_chunk_delay: Duration::from_millis(100),
        stop_on_error: false,
    }
}

/// Event whose created and updated stamps coincide.
pub fn created_event(id: &str) -> RawCalendarEvent {
    RawCalendarEvent {
        id: id.to_string(),
        status: Some("confirmed".into()),
        summary: Some(format!("Event {id}")),
        start: Some(EventDateTime {
            date_time: Some("2024-03-04T10:00:00Z".into()),
            ..EventDateTime::default()
        }),
        end: Some(EventDateTime {
            date_time: Some("2024-03-04T11:00:00Z".into()),
            ..EventDateTime::default()
        }),
        created: Some(CREATED_AT.into()),
        updated: Some(CREATED_AT.into()),
        ..RawCalendarEvent::default()
    }
}

pub fn updated_event(id: &str) -> RawCalendarEvent {
    RawCalendarEvent { updated: Some("2024-03-02T09:00:00Z".into()), ..created_event(id) }
}

/// Cancelled event linked to board item `item_id` through private metadata.
pub fn cancelled_event(id: &str, item_id: u64) -> RawCalendarEvent {
    let mut private = HashMap::new();
    private.insert("itemId".to_string(), item_id.to_string());
    RawCalendarEvent {
        id: id.to_string(),
        status: Some("cancelled".into()),
        extended_properties: Some(ExtendedProperties { private, ..ExtendedProperties::default() }),
        ..RawCalendarEvent::default()
    }
}

/// Cancelled event without any board reference.
pub fn orphan_cancelled_event(id: &str) -> RawCalendarEvent {
    RawCalendarEvent {
        id: id.to_string(),
        status: Some("cancelled".into()),
        ..RawCalendarEvent::default()
    }
}
