//! Per-key serial task queue
//!
//! Tasks enqueued under the same key run one at a time in arrival order.
//! Tasks under different keys run concurrently. Each key maps to the tail of
//! a chain of shared futures; a new task awaits the current tail before it
//! starts, and becomes the new tail.
//!
//! ## Failure isolation
//!
//! A task that returns an error or panics is logged and swallowed. The
//! chain always resolves to `()`, so the next task for the key still runs.
//!
//! ## Cleanup
//!
//! Every link carries a unique id. When a link finishes, its driver removes
//! the key from the map only if the stored tail still has that id; a task
//! enqueued meanwhile keeps its entry.
//!
//! A task that never completes blocks its key indefinitely. There is no
//! per-task timeout at this layer.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

type Tail = Shared<BoxFuture<'static, ()>>;

struct ChainLink {
    id: u64,
    tail: Tail,
}

/// Serializes async tasks per key
pub struct KeyedSerialQueue<K> {
    chains: Arc<Mutex<HashMap<K, ChainLink>>>,
    next_id: AtomicU64,
}

impl<K> Default for KeyedSerialQueue<K> {
    fn default() -> Self {
        Self { chains: Arc::new(Mutex::new(HashMap::new())), next_id: AtomicU64::new(0) }
    }
}

impl<K> fmt::Debug for KeyedSerialQueue<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedSerialQueue").field("active_keys", &self.chains.lock().len()).finish()
    }
}

impl<K> KeyedSerialQueue<K>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` behind every task already queued for `key`.
    ///
    /// Returns immediately. The handle resolves once the task has finished
    /// (successfully or not) and the key's entry has been cleaned up.
    pub fn enqueue<F, Fut, E>(&self, key: K, task: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let label = key.to_string();

        let tail = {
            let mut chains = self.chains.lock();
            let previous = chains.get(&key).map(|link| link.tail.clone());
            if previous.is_some() {
                debug!(key = %label, task_id = id, "queued behind running task");
            }

            let run_label = label.clone();
            let tail: Tail = async move {
                if let Some(previous) = previous {
                    previous.await;
                }
                debug!(key = %run_label, task_id = id, "task started");
                match AssertUnwindSafe(async move { task().await }).catch_unwind().await {
                    Ok(Ok(())) => debug!(key = %run_label, task_id = id, "task completed"),
                    Ok(Err(err)) => warn!(key = %run_label, task_id = id, error = %err, "task failed"),
                    Err(_) => error!(key = %run_label, task_id = id, "task panicked"),
                }
            }
            .boxed()
            .shared();

            chains.insert(key.clone(), ChainLink { id, tail: tail.clone() });
            tail
        };

        let chains = Arc::clone(&self.chains);
        tokio::spawn(async move {
            tail.await;
            let mut chains = chains.lock();
            if chains.get(&key).is_some_and(|link| link.id == id) {
                chains.remove(&key);
                debug!(key = %label, "queue drained");
            }
        })
    }

    /// Number of keys with queued or running work.
    pub fn active_keys(&self) -> usize {
        self.chains.lock().len()
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.chains.lock().contains_key(key)
    }
}
