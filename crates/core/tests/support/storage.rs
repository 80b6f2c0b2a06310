use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use boardsync_core::KeyValueStore;
use boardsync_domain::{BoardSyncError, Result as DomainResult};

/// `HashMap`-backed [`KeyValueStore`] that can be told to reject writes.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<Mutex<Vec<(String, String)>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        self
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Every successful `set`, in call order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(BoardSyncError::Storage("store is read-only".into()));
        }
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        self.writes.lock().unwrap().push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> DomainResult<bool> {
        Ok(self.values.lock().unwrap().remove(key).is_some())
    }
}
