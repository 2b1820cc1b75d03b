use std::time::Duration;

use beacon_signaling::CallState;

use crate::integration::{create_test_dispatcher, fast_config, init_tracing};
use crate::utils::connect_pair;

#[tokio::test]
async fn test_duplicate_snapshots_apply_answer_once() {
    init_tracing();

    let (dispatcher, store) = create_test_dispatcher(fast_config());
    store.duplicate_snapshots(true);

    let pair = connect_pair(&dispatcher)
        .await
        .expect("Call did not connect");

    // Give any redelivered snapshot time to reach the caller.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        pair.caller.remote_descriptions().await,
        vec![pair.callee.answer()]
    );
    assert_eq!(pair.caller_handle.state(), CallState::Connected);
}
