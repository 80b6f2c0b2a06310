//! Domain types and models
//!
//! Wire shapes for the calendar provider and the board platform, plus the
//! normalized events, channel registrations and queue keys the sync
//! pipeline passes between its stages.

pub mod board;
pub mod calendar;
pub mod channel;
pub mod event;
pub mod link;
pub mod queue;
pub mod webhook;

pub use board::{AccessToken, BoardMutation, MutationOutcome};
pub use calendar::{
    CalendarCredentials, ChangePage, ChangeRequest, EventDateTime, EventPerson,
    ExtendedProperties, InsertEventRequest, NewCalendarEvent, RawCalendarEvent, WatchRequest,
    WatchResponse,
};
pub use channel::{ChannelContext, ChannelRegistration};
pub use event::{BoardReference, ChangeType, DomainEvent, ReferenceSource};
pub use link::{EventZone, ScheduledItem};
pub use queue::QueueKey;
pub use webhook::{ResourceState, WebhookNotification};
