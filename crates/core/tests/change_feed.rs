//! Change feed client: pagination, cursor fallback and transient retries.

mod support;

use std::sync::Arc;

use boardsync_core::ChangeFeedClient;
use boardsync_domain::{BoardSyncError, ChangeType};
use support::{cancelled_event, created_event, retry_config, updated_event, ScriptedFeedProvider};

fn client(provider: &ScriptedFeedProvider) -> ChangeFeedClient {
    ChangeFeedClient::new(Arc::new(provider.clone()), retry_config())
}

#[tokio::test]
async fn full_sync_collects_every_page_and_final_cursor() {
    let provider = ScriptedFeedProvider::new()
        .then_page(vec![created_event("e1"), updated_event("e2")], Some("p2"))
        .then_last_page(vec![cancelled_event("e3", 42)], "T1");

    let outcome = client(&provider).sync("primary", "token", None).await.unwrap();

    assert!(outcome.full_sync);
    assert_eq!(outcome.next_cursor.as_deref(), Some("T1"));
    let kinds: Vec<_> = outcome.events.iter().map(|event| event.change_type()).collect();
    assert_eq!(kinds, vec![ChangeType::Create, ChangeType::Update, ChangeType::Delete]);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].page_token, None);
    assert_eq!(requests[1].page_token.as_deref(), Some("p2"));
    assert!(requests.iter().all(|request| request.sync_token.is_none()));
}

#[tokio::test]
async fn incremental_sync_passes_cursor_on_every_page() {
    let provider = ScriptedFeedProvider::new()
        .then_page(vec![], Some("p2"))
        .then_last_page(vec![updated_event("e1")], "T2");

    let outcome = client(&provider).sync("primary", "token", Some("T1")).await.unwrap();

    assert!(!outcome.full_sync);
    assert_eq!(outcome.next_cursor.as_deref(), Some("T2"));
    assert!(provider.requests().iter().all(|request| request.sync_token.as_deref() == Some("T1")));
}

#[tokio::test]
async fn invalidated_cursor_falls_back_to_one_full_sync() {
    let provider = ScriptedFeedProvider::new()
        .then_error(BoardSyncError::CursorInvalidated("410 Gone".into()))
        .then_last_page(vec![created_event("e1"), created_event("e2")], "FRESH");

    let outcome = client(&provider).sync("primary", "token", Some("STALE")).await.unwrap();

    assert!(outcome.full_sync);
    assert_eq!(outcome.events.len(), 2);
    assert_eq!(outcome.next_cursor.as_deref(), Some("FRESH"));

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].sync_token.as_deref(), Some("STALE"));
    assert_eq!(requests[1].sync_token, None);
}

#[tokio::test]
async fn second_invalidation_is_fatal() {
    let provider = ScriptedFeedProvider::new()
        .then_error(BoardSyncError::CursorInvalidated("410 Gone".into()))
        .then_error(BoardSyncError::CursorInvalidated("410 Gone".into()))
        .then_last_page(vec![created_event("never")], "UNUSED");

    let err = client(&provider).sync("primary", "token", Some("STALE")).await.unwrap_err();

    assert!(err.is_cursor_invalidated());
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn invalidation_without_cursor_is_not_retried() {
    let provider = ScriptedFeedProvider::new()
        .then_error(BoardSyncError::CursorInvalidated("410 Gone".into()));

    let err = client(&provider).sync("primary", "token", None).await.unwrap_err();

    assert!(err.is_cursor_invalidated());
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn connection_resets_are_retried_per_page() {
    let provider = ScriptedFeedProvider::new()
        .then_page(vec![created_event("e1")], Some("p2"))
        .then_error(BoardSyncError::ConnectionReset("ECONNRESET".into()))
        .then_last_page(vec![created_event("e2")], "T1");

    let outcome = client(&provider).sync("primary", "token", None).await.unwrap();

    assert_eq!(outcome.events.len(), 2);
    let pages: Vec<_> = provider.requests().into_iter().map(|request| request.page_token).collect();
    assert_eq!(pages, vec![None, Some("p2".to_string()), Some("p2".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn persistent_resets_give_up_after_three_attempts() {
    let provider = ScriptedFeedProvider::new()
        .then_error(BoardSyncError::ConnectionReset("reset 1".into()))
        .then_error(BoardSyncError::ConnectionReset("reset 2".into()))
        .then_error(BoardSyncError::ConnectionReset("reset 3".into()));

    let err = client(&provider).sync("primary", "token", None).await.unwrap_err();

    assert_eq!(err, BoardSyncError::ConnectionReset("reset 3".into()));
    assert_eq!(provider.requests().len(), 3);
}

#[tokio::test]
async fn other_failures_surface_immediately() {
    let provider =
        ScriptedFeedProvider::new().then_error(BoardSyncError::Auth("401 Unauthorized".into()));

    let err = client(&provider).sync("primary", "token", Some("T1")).await.unwrap_err();

    assert!(matches!(err, BoardSyncError::Auth(_)));
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn repeated_page_token_is_rejected() {
    let provider = ScriptedFeedProvider::new()
        .then_page(vec![], Some("loop"))
        .then_page(vec![], Some("loop"));

    let err = client(&provider).sync("primary", "token", None).await.unwrap_err();

    assert!(matches!(err, BoardSyncError::Remote(_)));
}
