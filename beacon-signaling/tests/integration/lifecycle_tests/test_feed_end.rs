use std::sync::Arc;

use beacon_signaling::{CallState, LocalPeer, MemoryStore, RoleDispatcher, SignalingError};
use tokio::sync::mpsc;

use crate::integration::{create_test_dispatcher, fast_config, init_tracing};
use crate::utils::{EndingStore, MockPeer, STATE_TIMEOUT_MS, wait_for_state};

fn ending_dispatcher() -> (RoleDispatcher, EndingStore) {
    let store = EndingStore::new(MemoryStore::new());
    let dispatcher = RoleDispatcher::new(Arc::new(store.clone()), fast_config());
    (dispatcher, store)
}

#[tokio::test]
async fn test_room_feed_ending_before_answer_fails_call() {
    init_tracing();

    let (dispatcher, store) = ending_dispatcher();
    store.end_record_feeds();

    let (caller, caller_local) = MockPeer::new("caller");
    let handle = dispatcher.create_call(caller_local).await.unwrap();

    let state = wait_for_state(&handle, STATE_TIMEOUT_MS, CallState::is_terminal)
        .await
        .expect("Caller kept waiting for an answer that can no longer arrive");
    assert!(matches!(
        state,
        CallState::Failed(SignalingError::StorageUnavailable(_))
    ));
    assert!(caller.was_closed().await);
    assert!(matches!(
        handle.wait_for_connected().await,
        Err(SignalingError::StorageUnavailable(_))
    ));
}

#[tokio::test]
async fn test_candidate_feed_ending_before_connect_fails_call() {
    init_tracing();

    let (dispatcher, store) = ending_dispatcher();
    store.end_addition_feeds();

    let (caller, caller_local) = MockPeer::new("caller");
    let handle = dispatcher.create_call(caller_local).await.unwrap();

    let state = wait_for_state(&handle, STATE_TIMEOUT_MS, CallState::is_terminal)
        .await
        .expect("Caller never ended");
    assert!(matches!(
        state,
        CallState::Failed(SignalingError::ChannelUnavailable(_))
    ));
    assert!(caller.was_closed().await);
}

#[tokio::test]
async fn test_engine_event_channel_closing_fails_call() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());

    // An engine that goes away without ever reporting a connection state.
    let (caller, _unused) = MockPeer::new("caller");
    let (events_tx, events_rx) = mpsc::channel(1);
    drop(events_tx);
    let caller_local = LocalPeer::new(Arc::new(caller.clone()), events_rx);

    let handle = dispatcher.create_call(caller_local).await.unwrap();

    let state = wait_for_state(&handle, STATE_TIMEOUT_MS, CallState::is_terminal)
        .await
        .expect("Caller never ended");
    match state {
        CallState::Failed(SignalingError::Capability(e)) => assert_eq!(e.operation, "events"),
        other => panic!("Expected a capability failure, got {:?}", other),
    }
    assert!(caller.was_closed().await);
}
