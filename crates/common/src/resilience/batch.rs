//! Chunked batch execution with per-item retry
//!
//! Items are split into consecutive chunks of `concurrency` items. Chunks run
//! one after another; the items of a chunk run concurrently on the current
//! task. Every item goes through the [`RetryExecutor`], and a failed item is
//! recorded in the summary instead of aborting the batch (unless
//! `stop_on_error` is set, in which case no chunk starts after one that
//! contained a failure).

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::retry::{RetryConfig, RetryError, RetryExecutor, RetryPolicy};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Items per chunk
    pub concurrency: usize,
    /// Retry behaviour applied to each item
    pub retry: RetryConfig,
    /// Pause between two chunks (not after the last)
    pub inter_chunk_delay: Duration,
    pub stop_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            retry: RetryConfig::default(),
            inter_chunk_delay: Duration::from_millis(100),
            stop_on_error: false,
        }
    }
}

impl BatchConfig {
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }
}

/// Builder for [`BatchConfig`]
#[derive(Debug, Default)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn inter_chunk_delay(mut self, delay: Duration) -> Self {
        self.config.inter_chunk_delay = delay;
        self
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.config.stop_on_error = stop;
        self
    }

    pub fn build(self) -> Result<BatchConfig, RetryError<()>> {
        if self.config.concurrency == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "concurrency must be greater than 0".to_string(),
            });
        }
        self.config.retry.validate()?;
        Ok(self.config)
    }
}

/// Outcome of one item
#[derive(Debug)]
pub struct BatchResult<T, E> {
    /// Position of the item in the input
    pub index: usize,
    /// How many times the operation ran for this item
    pub attempts: u32,
    pub result: Result<T, RetryError<E>>,
}

impl<T, E> BatchResult<T, E> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate outcome of a batch run
#[derive(Debug)]
pub struct BatchSummary<T, E> {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percentage in `0.0..=100.0`; an empty batch reports 100.
    pub success_rate: f64,
    /// Ordered by `index`
    pub results: Vec<BatchResult<T, E>>,
}

impl<T, E> BatchSummary<T, E> {
    fn from_results(mut results: Vec<BatchResult<T, E>>) -> Self {
        results.sort_by_key(|result| result.index);

        let total = results.len();
        let successful = results.iter().filter(|result| result.is_success()).count();
        let failed = total - successful;
        let success_rate =
            if total == 0 { 100.0 } else { successful as f64 / total as f64 * 100.0 };

        Self { total, successful, failed, success_rate, results }
    }

    pub fn successes(&self) -> impl Iterator<Item = &BatchResult<T, E>> {
        self.results.iter().filter(|result| result.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchResult<T, E>> {
        self.results.iter().filter(|result| !result.is_success())
    }
}

/// Runs many independent operations through a shared retry policy
#[derive(Debug, Clone)]
pub struct BatchRunner<P> {
    config: BatchConfig,
    executor: RetryExecutor<P>,
}

impl<P> BatchRunner<P> {
    pub fn new(config: BatchConfig, policy: P) -> Self {
        let executor = RetryExecutor::new(config.retry.clone(), policy);
        Self { config, executor }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run `operation` for every item. The operation receives a clone of the
    /// item and its input index on every attempt.
    pub async fn run<I, T, E, F, Fut>(&self, items: Vec<I>, operation: F) -> BatchSummary<T, E>
    where
        P: RetryPolicy<E>,
        I: Clone,
        E: fmt::Display,
        F: Fn(I, usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if items.is_empty() {
            return BatchSummary::from_results(Vec::new());
        }

        // A zero chunk size would never make progress.
        let chunk_size = self.config.concurrency.max(1);
        let chunk_count = items.len().div_ceil(chunk_size);
        info!(items = items.len(), concurrency = chunk_size, "starting batch");

        let mut results = Vec::with_capacity(items.len());

        for (chunk_index, chunk) in items.chunks(chunk_size).enumerate() {
            let offset = chunk_index * chunk_size;
            debug!(chunk = chunk_index + 1, chunks = chunk_count, size = chunk.len(), "processing chunk");

            let pending = chunk.iter().enumerate().map(|(position, item)| {
                let index = offset + position;
                let operation = &operation;
                async move {
                    let outcome =
                        self.executor.execute_with_outcome(|| operation(item.clone(), index)).await;
                    if let Err(error) = &outcome.result {
                        warn!(index, attempts = outcome.attempts, %error, "batch item failed");
                    }
                    BatchResult { index, attempts: outcome.attempts, result: outcome.result }
                }
            });

            let chunk_results = join_all(pending).await;
            let chunk_failed = chunk_results.iter().any(|result| !result.is_success());
            results.extend(chunk_results);

            if chunk_failed && self.config.stop_on_error {
                warn!(chunk = chunk_index + 1, "stopping batch after failed chunk");
                break;
            }

            if chunk_index + 1 < chunk_count && !self.config.inter_chunk_delay.is_zero() {
                tokio::time::sleep(self.config.inter_chunk_delay).await;
            }
        }

        let summary = BatchSummary::from_results(results);
        info!(
            successful = summary.successful,
            total = summary.total,
            success_rate = summary.success_rate,
            "batch completed"
        );
        summary
    }
}
