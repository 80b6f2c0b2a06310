use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use boardsync_core::ChangeFeedProvider;
use boardsync_domain::{
    BoardSyncError, ChangePage, ChangeRequest, InsertEventRequest, RawCalendarEvent,
    Result as DomainResult, WatchRequest, WatchResponse,
};

/// Owned copy of a [`ChangeRequest`] as the provider saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub calendar_id: String,
    pub access_token: String,
    pub sync_token: Option<String>,
    pub page_token: Option<String>,
}

/// Change feed provider that replays a script of responses in call order.
///
/// Once the script runs out every call returns an empty final page.
#[derive(Default, Clone)]
pub struct ScriptedFeedProvider {
    script: Arc<Mutex<VecDeque<DomainResult<ChangePage>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    latency: Arc<Mutex<Option<Duration>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    watch_result: Arc<Mutex<Option<DomainResult<WatchResponse>>>>,
    watches: Arc<Mutex<Vec<WatchRequest>>>,
    stop_error: Arc<Mutex<Option<BoardSyncError>>>,
    stops: Arc<Mutex<Vec<(String, String, String)>>>,
    insert_error: Arc<Mutex<Option<BoardSyncError>>>,
    inserts: Arc<Mutex<Vec<InsertEventRequest>>>,
}

impl ScriptedFeedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_page(self, items: Vec<RawCalendarEvent>, next_page: Option<&str>) -> Self {
        self.then(Ok(ChangePage {
            items,
            next_page_token: next_page.map(str::to_string),
            next_sync_token: None,
        }))
    }

    pub fn then_last_page(self, items: Vec<RawCalendarEvent>, sync_token: &str) -> Self {
        self.then(Ok(ChangePage {
            items,
            next_page_token: None,
            next_sync_token: Some(sync_token.to_string()),
        }))
    }

    pub fn then_error(self, error: BoardSyncError) -> Self {
        self.then(Err(error))
    }

    pub fn then(self, response: DomainResult<ChangePage>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    /// Hold every `list_changes` call for `latency` before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = Some(latency);
        self
    }

    pub fn with_watch_result(self, result: DomainResult<WatchResponse>) -> Self {
        *self.watch_result.lock().unwrap() = Some(result);
        self
    }

    pub fn with_stop_error(self, error: BoardSyncError) -> Self {
        *self.stop_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_insert_error(self, error: BoardSyncError) -> Self {
        *self.insert_error.lock().unwrap() = Some(error);
        self
    }

    pub fn inserts(&self) -> Vec<InsertEventRequest> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn watches(&self) -> Vec<WatchRequest> {
        self.watches.lock().unwrap().clone()
    }

    pub fn stops(&self) -> Vec<(String, String, String)> {
        self.stops.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChangeFeedProvider for ScriptedFeedProvider {
    async fn list_changes(&self, request: ChangeRequest<'_>) -> DomainResult<ChangePage> {
        let active = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(active, Ordering::SeqCst);

        self.requests.lock().unwrap().push(RecordedRequest {
            calendar_id: request.calendar_id.to_string(),
            access_token: request.access_token.to_string(),
            sync_token: request.sync_token.map(str::to_string),
            page_token: request.page_token.map(str::to_string),
        });

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let response = self.script.lock().unwrap().pop_front().unwrap_or_else(|| Ok(ChangePage::default()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }

    async fn watch(&self, request: &WatchRequest) -> DomainResult<WatchResponse> {
        self.watches.lock().unwrap().push(request.clone());
        self.watch_result.lock().unwrap().clone().unwrap_or_else(|| {
            Ok(WatchResponse {
                channel_id: request.channel_id.clone(),
                resource_id: "resource-1".into(),
                expiration: Some(1_900_000_000_000),
            })
        })
    }

    async fn stop(&self, access_token: &str, channel_id: &str, resource_id: &str) -> DomainResult<()> {
        self.stops.lock().unwrap().push((
            access_token.to_string(),
            channel_id.to_string(),
            resource_id.to_string(),
        ));
        match self.stop_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Echoes the body back the way the provider stores it, under a
    /// sequential id.
    async fn insert_event(&self, request: &InsertEventRequest) -> DomainResult<RawCalendarEvent> {
        let mut inserts = self.inserts.lock().unwrap();
        inserts.push(request.clone());
        if let Some(error) = self.insert_error.lock().unwrap().clone() {
            return Err(error);
        }

        let mut stored = serde_json::to_value(&request.event)
            .map_err(|err| BoardSyncError::Internal(err.to_string()))?;
        stored["id"] = format!("created-{}", inserts.len()).into();
        stored["status"] = "confirmed".into();
        serde_json::from_value(stored).map_err(|err| BoardSyncError::Internal(err.to_string()))
    }
}
