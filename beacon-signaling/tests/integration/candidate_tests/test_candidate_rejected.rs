use beacon_signaling::{CallState, SignalingError};

use crate::integration::{create_test_dispatcher, fast_config, init_tracing};
use crate::utils::{STATE_TIMEOUT_MS, connect_pair, wait_for_state};

#[tokio::test]
async fn test_rejected_candidate_fails_call() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());
    let pair = connect_pair(&dispatcher)
        .await
        .expect("Call did not connect");

    pair.callee.reject_candidates();
    pair.caller.gather("garbage").await;

    let state = wait_for_state(&pair.callee_handle, STATE_TIMEOUT_MS, CallState::is_terminal)
        .await
        .expect("Callee never ended");

    match state {
        CallState::Failed(SignalingError::Capability(cause)) => {
            assert_eq!(cause.operation, "add_ice_candidate");
        }
        other => panic!("Unexpected terminal state: {:?}", other),
    }
    assert!(pair.callee.was_closed().await);
}
