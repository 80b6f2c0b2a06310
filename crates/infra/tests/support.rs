//! Shared helpers for `boardsync-infra` integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use boardsync_core::KeyValueStore;
use boardsync_domain::{AppConfig, CalendarCredentials, ChannelContext};
use boardsync_infra::http::HttpClient;
use boardsync_infra::{MemoryKeyValueStore, SyncRuntime};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const WEBHOOK_URL: &str = "https://hooks.example.com/calendar";

/// Config pointing both providers at local mock servers. Retry delays are
/// shrunk so exhausted retries finish quickly on real time.
pub fn config_for(google: &MockServer, monday: &MockServer) -> AppConfig {
    let mut config = AppConfig::with_webhook_url(WEBHOOK_URL);
    config.google.api_base_url = format!("{}/calendar/v3", google.uri());
    config.monday.api_url = format!("{}/v2", monday.uri());
    config.retry.base_delay_ms = 10;
    config.batch.inter_chunk_delay_ms = 0;
    config
}

pub struct TestRuntime {
    pub runtime: SyncRuntime,
    pub store: Arc<MemoryKeyValueStore>,
}

pub fn runtime_for(config: &AppConfig) -> TestRuntime {
    let store = Arc::new(MemoryKeyValueStore::new());
    let shared: Arc<dyn KeyValueStore> = store.clone();
    let runtime = SyncRuntime::with_store(config, shared).expect("runtime should build");
    TestRuntime { runtime, store }
}

pub fn http_client() -> HttpClient {
    HttpClient::new().expect("http client should build")
}

pub fn credentials(access_token: &str) -> CalendarCredentials {
    CalendarCredentials {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh".into()),
        expiry_date: None,
    }
}

pub fn channel_token(subject_id: &str, account_id: Option<&str>) -> String {
    ChannelContext::new(subject_id, account_id.map(str::to_string))
        .encode()
        .expect("context should encode")
}

/// Events page body as the calendar API returns it.
pub fn events_page(items: Value, next_page: Option<&str>, next_sync: Option<&str>) -> Value {
    let mut page = json!({ "kind": "calendar#events", "items": items });
    if let Some(token) = next_page {
        page["nextPageToken"] = json!(token);
    }
    if let Some(token) = next_sync {
        page["nextSyncToken"] = json!(token);
    }
    page
}

pub fn cancelled_item(id: &str, item_id: u64) -> Value {
    json!({
        "id": id,
        "status": "cancelled",
        "extendedProperties": { "private": { "itemId": item_id.to_string() } }
    })
}

pub fn watch_response(channel_id: &str, resource_id: &str) -> Value {
    json!({
        "kind": "api#channel",
        "id": channel_id,
        "resourceId": resource_id,
        "resourceUri": "https://www.googleapis.com/calendar/v3/calendars/primary/events",
        "expiration": "1900000000000"
    })
}

pub fn deleted_item(id: &str) -> Value {
    json!({ "data": { "delete_item": { "id": id } } })
}
