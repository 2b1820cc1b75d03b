use beacon_signaling::{CallState, PeerConnectionState, PeerEvent, SignalingError};

use crate::integration::{create_test_dispatcher, fast_config, init_tracing};
use crate::utils::{STATE_TIMEOUT_MS, connect_pair, wait_for_state};

#[tokio::test]
async fn test_transport_failure_fails_call() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());
    let pair = connect_pair(&dispatcher)
        .await
        .expect("Call did not connect");

    pair.caller
        .emit(PeerEvent::ConnectionState(PeerConnectionState::Failed))
        .await;

    let state = wait_for_state(&pair.caller_handle, STATE_TIMEOUT_MS, CallState::is_terminal)
        .await
        .expect("Caller never ended");
    assert!(matches!(
        state,
        CallState::Failed(SignalingError::Capability(_))
    ));
    assert!(pair.caller.was_closed().await);

    // The other side is unaffected until its own engine notices.
    assert_eq!(pair.callee_handle.state(), CallState::Connected);
}

#[tokio::test]
async fn test_disconnect_is_not_terminal() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());
    let pair = connect_pair(&dispatcher)
        .await
        .expect("Call did not connect");

    pair.callee
        .emit(PeerEvent::ConnectionState(PeerConnectionState::Disconnected))
        .await;
    pair.callee.connect().await;

    // A flapping transport does not end the call.
    pair.callee.gather("after-reconnect").await;
    let added = pair
        .caller
        .wait_for_candidates(1, STATE_TIMEOUT_MS)
        .await;
    assert_eq!(added.len(), 1);
    assert_eq!(pair.callee_handle.state(), CallState::Connected);
}

#[tokio::test]
async fn test_engine_progress_events_keep_call_connected() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());
    let pair = connect_pair(&dispatcher)
        .await
        .expect("Call did not connect");

    pair.caller
        .emit(PeerEvent::IceConnectionState("checking".into()))
        .await;
    pair.caller
        .emit(PeerEvent::IceConnectionState("connected".into()))
        .await;
    pair.caller
        .emit(PeerEvent::IceGatheringState("complete".into()))
        .await;
    pair.caller
        .emit(PeerEvent::SignalingState("stable".into()))
        .await;

    // Ordered behind the events above, so the caller has handled them once it arrives.
    pair.caller.gather("after-progress").await;
    let added = pair
        .callee
        .wait_for_candidates(1, STATE_TIMEOUT_MS)
        .await;
    assert_eq!(added.len(), 1);
    assert_eq!(pair.caller_handle.state(), CallState::Connected);
    assert!(!pair.caller.was_closed().await);
}
