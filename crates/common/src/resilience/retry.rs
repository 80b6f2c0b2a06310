//! Bounded retry with linear backoff
//!
//! An async operation runs up to `max_attempts` times. After the n-th
//! failed attempt the executor sleeps `n × base` (2s, 4s, 6s for a 2s base)
//! before trying again. A [`RetryPolicy`] decides whether a failure is worth
//! another attempt; failures it rejects surface immediately. When the budget
//! runs out the error of the final attempt is returned inside
//! [`RetryError::AttemptsExhausted`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, instrument, warn};

pub use crate::error::{RetryError, RetryResult};

/// Result of an execution together with the number of invocations.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    pub attempts: u32,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }
}

/// Classifies failures as transient or final
pub trait RetryPolicy<E> {
    /// `attempt` is the one-based number of the attempt that failed.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Stop,
}

/// Delay that grows by `base` with every failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    pub base: Duration,
}

impl LinearBackoff {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Sleep before the attempt following the one-based `failed_attempt`.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        self.base.saturating_mul(failed_attempt)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    pub backoff: LinearBackoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, backoff: LinearBackoff::new(Duration::from_secs(2)) }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::zero_attempts());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.config.backoff = LinearBackoff::new(base);
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Runs operations under a [`RetryConfig`] and a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Like [`execute`](Self::execute), also reporting how many attempts ran.
    #[instrument(level = "debug", skip_all, fields(max_attempts = self.config.max_attempts))]
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts;
        if max_attempts == 0 {
            return RetryOutcome { result: Err(RetryError::zero_attempts()), attempts: 0 };
        }

        let mut attempt = 1;
        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "operation recovered");
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt };
                }
                Err(error) => error,
            };

            if self.policy.should_retry(&error, attempt) == RetryDecision::Stop {
                debug!(attempt, %error, "error is not retryable");
                return RetryOutcome {
                    result: Err(RetryError::NonRetryable { attempts: attempt, source: error }),
                    attempts: attempt,
                };
            }

            if attempt >= max_attempts {
                warn!(attempt, max_attempts, %error, "retry budget exhausted");
                return RetryOutcome {
                    result: Err(RetryError::AttemptsExhausted { attempts: attempt, source: error }),
                    attempts: attempt,
                };
            }

            let delay = self.config.backoff.delay_after(attempt);
            warn!(
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                %error,
                "transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// One-shot form of [`RetryExecutor::execute`].
pub async fn retry_with_policy<F, Fut, T, E, P>(
    config: RetryConfig,
    policy: P,
    operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: fmt::Display,
{
    RetryExecutor::new(config, policy).execute(operation).await
}

pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Retries exactly the errors `predicate` accepts.
    #[derive(Debug, Clone, Copy)]
    pub struct RetryIf<F> {
        predicate: F,
    }

    impl<F> RetryIf<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for RetryIf<F>
    where
        F: Fn(&E) -> bool,
    {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if (self.predicate)(error) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
