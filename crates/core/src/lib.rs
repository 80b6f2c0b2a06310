//! # BoardSync Core
//!
//! Calendar-to-board synchronization logic with no infrastructure code.
//!
//! This crate contains:
//! - Port interfaces for the calendar provider, board platform and storage
//! - The change feed client, sync service and event dispatcher
//! - Channel lifecycle and webhook ingress
//! - Creation of calendar events linked to board items
//!
//! ## Architecture Principles
//! - Only depends on `boardsync-common` and `boardsync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod channel;
pub mod dispatch;
pub mod link;
pub mod resilience;
pub mod sync;
pub mod webhook;

// Infrastructure ports
pub mod board_ports;
pub mod calendar_ports;
pub mod storage_ports;

pub use board_ports::{AuthProvider, BoardClient};
pub use calendar_ports::ChangeFeedProvider;
pub use channel::ChannelManager;
pub use dispatch::{DispatchReport, EventDispatcher, EventDisposition};
pub use link::EventLinkService;
pub use resilience::TransientOnly;
pub use storage_ports::KeyValueStore;
pub use sync::{
    CalendarCredentialStore, CalendarSyncService, ChangeFeedClient, SyncCursorStore,
    SyncOutcome, SyncRunReport,
};
pub use webhook::{WebhookAck, WebhookIngress};
