use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use boardsync_core::{AuthProvider, BoardClient};
use boardsync_domain::{AccessToken, BoardMutation, MutationOutcome, Result as DomainResult};

/// Fixed account-to-token table.
#[derive(Default, Clone)]
pub struct MockAuthProvider {
    tokens: Arc<Mutex<HashMap<String, String>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, account_id: &str, token: &str) -> Self {
        self.tokens.lock().unwrap().insert(account_id.to_string(), token.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn get_access_token(&self, account_id: &str) -> DomainResult<Option<AccessToken>> {
        self.lookups.lock().unwrap().push(account_id.to_string());
        Ok(self.tokens.lock().unwrap().get(account_id).map(AccessToken::bearer))
    }
}

/// One `mutate` call as the board saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMutation {
    pub access_token: String,
    pub mutation: BoardMutation,
}

impl RecordedMutation {
    pub fn item_id(&self) -> Option<String> {
        self.mutation.variables["itemId"].as_str().map(str::to_string)
    }
}

/// Board client that records every mutation and replays scripted
/// responses per item. Unscripted items succeed.
#[derive(Default, Clone)]
pub struct RecordingBoardClient {
    calls: Arc<Mutex<Vec<RecordedMutation>>>,
    scripted: Arc<Mutex<HashMap<String, VecDeque<DomainResult<MutationOutcome>>>>>,
}

impl RecordingBoardClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_for(self, item_id: u64, response: DomainResult<MutationOutcome>) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .entry(item_id.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedMutation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, item_id: u64) -> usize {
        let wanted = item_id.to_string();
        self.calls().iter().filter(|call| call.item_id().as_deref() == Some(wanted.as_str())).count()
    }
}

#[async_trait]
impl BoardClient for RecordingBoardClient {
    async fn mutate(
        &self,
        access_token: &str,
        mutation: &BoardMutation,
    ) -> DomainResult<MutationOutcome> {
        let call = RecordedMutation {
            access_token: access_token.to_string(),
            mutation: mutation.clone(),
        };
        let item_id = call.item_id().unwrap_or_default();
        self.calls.lock().unwrap().push(call);

        let scripted = self.scripted.lock().unwrap().get_mut(&item_id).and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| {
            Ok(MutationOutcome { success: true, errors: None, result_id: Some(item_id) })
        })
    }
}
