//! # BoardSync Domain
//!
//! Domain types for the calendar change-synchronization pipeline.
//!
//! This crate contains:
//! - Calendar and board wire types, normalized events, channel registrations
//! - The `BoardSyncError` type and `Result` alias
//! - Configuration structures
//! - Storage key prefixes and pipeline defaults
//! - The calendar event normalizer and the linked-event builder
//!
//! ## Architecture
//! - No dependencies on other BoardSync crates
//! - Only external dependencies allowed

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::event_builder::build_linked_event;
pub use utils::event_mapper::normalize_event;
