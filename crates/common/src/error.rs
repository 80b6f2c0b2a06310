//! Error types shared by the resilience primitives
//!
//! Kept free of any async runtime so that crates which only classify or
//! report failures can depend on the `foundation` tier alone.

use thiserror::Error;

/// Why a retried operation did not produce a value
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with an error the policy accepted for retry
    #[error("gave up after {attempts} attempts: {source}")]
    AttemptsExhausted { attempts: u32, source: E },

    /// The policy refused to retry this error
    #[error("failed without retry after {attempts} attempt(s): {source}")]
    NonRetryable { attempts: u32, source: E },

    #[error("invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::AttemptsExhausted { attempts, .. } | Self::NonRetryable { attempts, .. } => {
                *attempts
            }
            Self::InvalidConfiguration { .. } => 0,
        }
    }

    /// The error raised by the last attempt, if the operation ran at all.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { source, .. } | Self::NonRetryable { source, .. } => {
                Some(source)
            }
            Self::InvalidConfiguration { .. } => None,
        }
    }

    pub(crate) fn zero_attempts() -> Self {
        Self::InvalidConfiguration { message: "max_attempts must be greater than 0".to_string() }
    }
}

pub type RetryResult<T, E> = Result<T, RetryError<E>>;
