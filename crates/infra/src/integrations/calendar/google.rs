//! Google Calendar change feed and event inserts over the v3 REST API

use async_trait::async_trait;
use boardsync_core::ChangeFeedProvider;
use boardsync_domain::constants::CHANNEL_TYPE_WEB_HOOK;
use boardsync_domain::{
    BoardSyncError, ChangePage, ChangeRequest, InsertEventRequest, RawCalendarEvent, Result,
    WatchRequest, WatchResponse,
};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::errors::status_error;
use crate::http::{read_json, HttpClient};

/// Largest page the events endpoint serves.
const MAX_RESULTS: &str = "2500";
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WatchBody<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    address: &'a str,
    token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StopBody<'a> {
    id: &'a str,
    resource_id: &'a str,
}

/// [`ChangeFeedProvider`] backed by Google Calendar
pub struct GoogleCalendarFeed {
    http: HttpClient,
    base_url: String,
}

impl GoogleCalendarFeed {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(calendar_id))
    }
}

#[async_trait]
impl ChangeFeedProvider for GoogleCalendarFeed {
    #[instrument(skip_all, fields(calendar_id = request.calendar_id, incremental = request.sync_token.is_some()))]
    async fn list_changes(&self, request: ChangeRequest<'_>) -> Result<ChangePage> {
        let mut query = vec![
            ("singleEvents", "true"),
            ("showDeleted", "true"),
            ("maxResults", MAX_RESULTS),
        ];
        if let Some(sync_token) = request.sync_token {
            query.push(("syncToken", sync_token));
        }
        if let Some(page_token) = request.page_token {
            query.push(("pageToken", page_token));
        }

        let builder = self
            .http
            .request(Method::GET, self.events_url(request.calendar_id))
            .bearer_auth(request.access_token)
            .query(&query);
        let response = self.http.send(builder).await?;

        if response.status() == StatusCode::GONE {
            let detail = error_body(response).await;
            return Err(BoardSyncError::CursorInvalidated(format!(
                "sync token for {} is no longer valid: {detail}",
                request.calendar_id
            )));
        }
        let page: ChangePage = read_json(ensure_success(response).await?).await?;
        debug!(items = page.items.len(), has_next = page.next_page_token.is_some(), "events page");
        Ok(page)
    }

    #[instrument(skip_all, fields(calendar_id = %request.calendar_id, channel_id = %request.channel_id))]
    async fn watch(&self, request: &WatchRequest) -> Result<WatchResponse> {
        let body = WatchBody {
            id: &request.channel_id,
            kind: CHANNEL_TYPE_WEB_HOOK,
            address: &request.address,
            token: &request.token,
        };
        let builder = self
            .http
            .request(Method::POST, format!("{}/watch", self.events_url(&request.calendar_id)))
            .bearer_auth(&request.access_token)
            .json(&body);

        let response = ensure_success(self.http.send(builder).await?).await?;
        read_json(response).await
    }

    #[instrument(skip(self, access_token))]
    async fn stop(&self, access_token: &str, channel_id: &str, resource_id: &str) -> Result<()> {
        let builder = self
            .http
            .request(Method::POST, format!("{}/channels/stop", self.base_url))
            .bearer_auth(access_token)
            .json(&StopBody { id: channel_id, resource_id });

        ensure_success(self.http.send(builder).await?).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(calendar_id = %request.calendar_id))]
    async fn insert_event(&self, request: &InsertEventRequest) -> Result<RawCalendarEvent> {
        let builder = self
            .http
            .request(Method::POST, self.events_url(&request.calendar_id))
            .bearer_auth(&request.access_token)
            .json(&request.event);

        let response = ensure_success(self.http.send(builder).await?).await?;
        let created: RawCalendarEvent = read_json(response).await?;
        debug!(event_id = %created.id, "event inserted");
        Ok(created)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = error_body(response).await;
    Err(status_error(status.as_u16(), &detail))
}

async fn error_body(response: Response) -> String {
    let status = response.status();
    let mut text = response.text().await.unwrap_or_default();
    if text.trim().is_empty() {
        return status.canonical_reason().unwrap_or("no response body").to_string();
    }
    if text.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}
