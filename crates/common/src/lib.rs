//! Runtime utilities shared across BoardSync crates.
//!
//! Nothing in here knows about calendars or boards: the retry executor and
//! batch runner are generic over the caller's error type, and the serial
//! queue is generic over its key.
//!
//! # Feature Tiers
//!
//! - `foundation`: the `RetryError` type, usable without an async runtime
//! - `runtime`: async resilience (retry, batch) and the keyed serial queue

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;
#[cfg(feature = "runtime")]
pub mod sync;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{RetryError, RetryResult};
#[cfg(feature = "runtime")]
pub use resilience::{
    policies, retry_with_policy, BatchConfig, BatchResult, BatchRunner, BatchSummary,
    LinearBackoff, RetryConfig, RetryDecision, RetryExecutor, RetryOutcome, RetryPolicy,
};
#[cfg(feature = "runtime")]
pub use sync::KeyedSerialQueue;
