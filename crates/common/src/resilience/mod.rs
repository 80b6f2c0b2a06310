//! Resilience patterns for remote calls
//!
//! - **Retry**: bounded attempts with a policy deciding which failures are
//!   transient, and linear backoff between attempts
//! - **Batch**: chunked concurrent execution where every item goes through
//!   the retry executor and failures are collected instead of propagated

pub mod batch;
pub mod retry;

// Re-export batch types
pub use batch::{BatchConfig, BatchConfigBuilder, BatchResult, BatchRunner, BatchSummary};
// Re-export retry types
pub use retry::{
    policies, retry_with_policy, LinearBackoff, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};
