//! Retry wiring for calls into remote collaborators
//!
//! Only connection resets are retried. Everything else surfaces on the first
//! failure.

use std::time::Duration;

use boardsync_common::resilience::{
    BatchConfig, LinearBackoff, RetryConfig, RetryDecision, RetryError, RetryPolicy,
};
use boardsync_domain::config::{BatchConfig as BatchSettings, RetryConfig as RetrySettings};
use boardsync_domain::BoardSyncError;

/// Retries transport resets, stops on anything else
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientOnly;

impl RetryPolicy<BoardSyncError> for TransientOnly {
    fn should_retry(&self, error: &BoardSyncError, _attempt: u32) -> RetryDecision {
        if error.is_transient() {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// Linear backoff from the configured base delay.
pub fn retry_config(settings: &RetrySettings) -> RetryConfig {
    RetryConfig {
        max_attempts: settings.max_attempts,
        backoff: LinearBackoff::new(Duration::from_millis(settings.base_delay_ms)),
    }
}

pub fn batch_config(batch: &BatchSettings, retry: &RetrySettings) -> BatchConfig {
    BatchConfig {
        concurrency: batch.concurrency,
        retry: retry_config(retry),
        inter_chunk_delay: Duration::from_millis(batch.inter_chunk_delay_ms),
        stop_on_error: batch.stop_on_error,
    }
}

/// Unwrap the error of the last attempt.
pub fn into_domain_error(error: RetryError<BoardSyncError>) -> BoardSyncError {
    match error {
        RetryError::AttemptsExhausted { source, .. } | RetryError::NonRetryable { source, .. } => {
            source
        }
        RetryError::InvalidConfiguration { message } => BoardSyncError::Config(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_resets_are_retried() {
        assert_eq!(
            TransientOnly.should_retry(&BoardSyncError::ConnectionReset("reset".into()), 1),
            RetryDecision::Retry
        );
        assert_eq!(
            TransientOnly.should_retry(&BoardSyncError::Network("timeout".into()), 1),
            RetryDecision::Stop
        );
    }

    #[test]
    fn settings_map_to_linear_schedule() {
        let config = retry_config(&RetrySettings { max_attempts: 3, base_delay_ms: 2_000 });
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff.delay_after(3), Duration::from_secs(6));

        let batch = batch_config(&BatchSettings::default(), &RetrySettings::default());
        assert_eq!(batch.concurrency, 10);
        assert_eq!(batch.inter_chunk_delay, Duration::from_millis(100));
    }

    #[test]
    fn retry_errors_unwrap_to_last_error() {
        let exhausted = RetryError::AttemptsExhausted {
            attempts: 3,
            source: BoardSyncError::ConnectionReset("third".into()),
        };
        assert_eq!(into_domain_error(exhausted), BoardSyncError::ConnectionReset("third".into()));

        let invalid = RetryError::InvalidConfiguration { message: "zero".into() };
        assert!(matches!(into_domain_error(invalid), BoardSyncError::Config(_)));
    }
}
