//! Calendar change synchronization
//!
//! - `cursor`: per-(subject, calendar) continuation tokens
//! - `credentials`: per-subject calendar OAuth credentials
//! - `feed`: paginated change feed client with cursor fallback
//! - `service`: the sync task run for each queued webhook

pub mod credentials;
pub mod cursor;
pub mod feed;
pub mod service;

pub use credentials::{credentials_key, CalendarCredentialStore};
pub use cursor::{cursor_key, SyncCursorStore};
pub use feed::{ChangeFeedClient, SyncOutcome};
pub use service::{CalendarSyncService, SyncRunReport};
