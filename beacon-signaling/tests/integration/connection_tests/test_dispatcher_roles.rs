use beacon_core::Role;
use beacon_signaling::CallState;

use crate::integration::{create_test_dispatcher, fast_config, init_tracing};
use crate::utils::{MockPeer, STATE_TIMEOUT_MS, wait_for_state};

#[tokio::test]
async fn test_start_picks_role_from_room_id() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());

    let (caller, caller_local) = MockPeer::new("caller");
    let caller_handle = dispatcher
        .start(None, caller_local)
        .await
        .expect("Failed to start as initiator");
    assert_eq!(caller_handle.role(), Role::Initiator);
    assert_eq!(caller_handle.state(), CallState::AwaitingRemoteDescription);

    let (callee, callee_local) = MockPeer::new("callee");
    let callee_handle = dispatcher
        .start(Some(caller_handle.room_id().clone()), callee_local)
        .await
        .expect("Failed to start as joiner");
    assert_eq!(callee_handle.role(), Role::Joiner);
    assert_eq!(callee_handle.state(), CallState::Connecting);

    let state = wait_for_state(&caller_handle, STATE_TIMEOUT_MS, |s| {
        *s == CallState::Connecting
    })
    .await;
    assert_eq!(state, Some(CallState::Connecting));

    caller.connect().await;
    callee.connect().await;
    assert_eq!(caller_handle.wait_for_connected().await, Ok(()));
    assert_eq!(callee_handle.wait_for_connected().await, Ok(()));
}

#[tokio::test]
async fn test_calls_through_one_dispatcher_are_independent() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());

    let (_first, first_local) = MockPeer::new("first");
    let (_second, second_local) = MockPeer::new("second");
    let first = dispatcher.create_call(first_local).await.unwrap();
    let second = dispatcher.create_call(second_local).await.unwrap();

    assert_ne!(first.room_id(), second.room_id());

    assert_eq!(dispatcher.close_call(&first).await, CallState::Closed);
    assert_eq!(second.state(), CallState::AwaitingRemoteDescription);
}
