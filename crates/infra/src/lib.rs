//! # BoardSync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Google Calendar change feed and monday.com board client over HTTP
//! - In-memory and SQLite key-value stores
//! - Cached access-token provider
//! - Configuration loading and logging setup
//! - The runtime builder that wires everything together
//!
//! ## Architecture
//! - Implements traits defined in `boardsync-core`
//! - Contains all "impure" code (I/O, HTTP, SQLite)

pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod runtime;
pub mod storage;

// Re-export commonly used items
pub use auth::StoredTokenProvider;
pub use errors::InfraError;
pub use integrations::{GoogleCalendarFeed, MondayBoardClient};
pub use observability::init_tracing;
pub use runtime::SyncRuntime;
pub use storage::{MemoryKeyValueStore, SqliteKeyValueStore};
