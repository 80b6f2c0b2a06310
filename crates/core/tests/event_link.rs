//! Board items scheduled onto the calendar and traced back on cancellation.

mod support;

use std::sync::Arc;

use boardsync_core::sync::{credentials_key, cursor_key};
use boardsync_core::{
    CalendarCredentialStore, CalendarSyncService, ChangeFeedClient, EventDispatcher,
    EventLinkService, SyncCursorStore,
};
use boardsync_domain::{BoardSyncError, EventZone, QueueKey, ScheduledItem};
use support::{
    batch_config, retry_config, InMemoryStore, MockAuthProvider, RecordingBoardClient,
    ScriptedFeedProvider,
};

const CREDENTIALS: &str = r#"{"access_token":"cal-token"}"#;

fn link_service(store: &InMemoryStore, provider: &ScriptedFeedProvider) -> EventLinkService {
    EventLinkService::new(
        Arc::new(provider.clone()),
        CalendarCredentialStore::new(Arc::new(store.clone())),
        EventZone::default(),
    )
}

fn standup() -> ScheduledItem {
    ScheduledItem {
        item_id: 812,
        board_id: Some(31),
        user_id: Some("4401".into()),
        title: "Standup".into(),
        description: None,
        start_time: "03/06/2024 08:45".into(),
        end_time: "03 June 2024 09:00".into(),
        attendee_email: Some("dev@example.com".into()),
    }
}

#[tokio::test]
async fn created_event_carries_board_reference() {
    let store = InMemoryStore::new().with_value(&credentials_key("sub1"), CREDENTIALS);
    let provider = ScriptedFeedProvider::new();

    let created = link_service(&store, &provider)
        .create_linked_event("sub1", "team@group.calendar.google.com", &standup())
        .await
        .unwrap()
        .expect("credentials are stored");

    let inserts = provider.inserts();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].calendar_id, "team@group.calendar.google.com");
    assert_eq!(inserts[0].access_token, "cal-token");
    assert_eq!(inserts[0].event.start.date_time.as_deref(), Some("2024-06-03T08:45:00+07:00"));
    assert_eq!(inserts[0].event.end.date_time.as_deref(), Some("2024-06-03T09:00:00+07:00"));

    assert_eq!(created.id, "created-1");
    let private = created.private_properties().unwrap();
    assert_eq!(private["itemId"], "812");
    assert_eq!(private["boardId"], "31");
    assert_eq!(private["userId"], "4401");
}

#[tokio::test]
async fn missing_credentials_create_nothing() {
    let store = InMemoryStore::new();
    let provider = ScriptedFeedProvider::new();

    let created =
        link_service(&store, &provider).create_linked_event("sub1", "primary", &standup()).await;

    assert!(matches!(created, Ok(None)));
    assert!(provider.inserts().is_empty());
}

#[tokio::test]
async fn unparseable_time_is_rejected_before_any_call() {
    let store = InMemoryStore::new().with_value(&credentials_key("sub1"), CREDENTIALS);
    let provider = ScriptedFeedProvider::new();
    let item = ScheduledItem { start_time: "next monday".into(), ..standup() };

    let result = link_service(&store, &provider).create_linked_event("sub1", "primary", &item).await;

    assert!(matches!(result, Err(BoardSyncError::InvalidInput(_))));
    assert!(provider.inserts().is_empty());
}

#[tokio::test]
async fn insert_failure_is_not_retried() {
    let store = InMemoryStore::new().with_value(&credentials_key("sub1"), CREDENTIALS);
    let provider = ScriptedFeedProvider::new()
        .with_insert_error(BoardSyncError::ConnectionReset("peer reset".into()));

    let result =
        link_service(&store, &provider).create_linked_event("sub1", "primary", &standup()).await;

    assert!(matches!(result, Err(BoardSyncError::ConnectionReset(_))));
    assert_eq!(provider.inserts().len(), 1);
}

#[tokio::test]
async fn cancelling_a_created_event_deletes_its_item() {
    let store = InMemoryStore::new()
        .with_value(&credentials_key("sub1"), CREDENTIALS)
        .with_value(&cursor_key("sub1", "primary"), "T1");
    let provider = ScriptedFeedProvider::new();
    let board = RecordingBoardClient::new();

    let mut created = link_service(&store, &provider)
        .create_linked_event("sub1", "primary", &standup())
        .await
        .unwrap()
        .unwrap();
    created.status = Some("cancelled".into());
    let _ = provider.clone().then_last_page(vec![created], "T2");

    let kv = Arc::new(store.clone());
    let sync = CalendarSyncService::new(
        CalendarCredentialStore::new(kv.clone()),
        SyncCursorStore::new(kv),
        ChangeFeedClient::new(Arc::new(provider.clone()), retry_config()),
        EventDispatcher::new(
            Arc::new(MockAuthProvider::new().with_token("acct-1", "board-token")),
            Arc::new(board.clone()),
            batch_config(),
        ),
    );

    let report = sync.run(&QueueKey::new("sub1", "primary", Some("acct-1".into()))).await.unwrap();

    assert_eq!(report.events, 1);
    let calls = board.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].item_id().as_deref(), Some("812"));
    assert_eq!(store.value(&cursor_key("sub1", "primary")).as_deref(), Some("T2"));
}
