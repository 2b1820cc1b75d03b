use beacon_core::{Role, RoomRecord};
use beacon_signaling::CallState;

use crate::integration::{create_test_dispatcher, fast_config, init_tracing};
use crate::utils::{PeerCall, connect_pair};

#[tokio::test]
async fn test_end_to_end_call() {
    init_tracing();

    let (dispatcher, store) = create_test_dispatcher(fast_config());
    let pair = connect_pair(&dispatcher)
        .await
        .expect("Call did not connect");

    assert_eq!(pair.caller_handle.role(), Role::Initiator);
    assert_eq!(pair.callee_handle.role(), Role::Joiner);
    assert_eq!(pair.caller_handle.room_id(), pair.callee_handle.room_id());
    assert_eq!(pair.caller_handle.state(), CallState::Connected);
    assert_eq!(pair.callee_handle.state(), CallState::Connected);

    // Each side applied exactly the other side's description, once.
    assert_eq!(
        pair.caller.remote_descriptions().await,
        vec![pair.callee.answer()]
    );
    assert_eq!(
        pair.callee.remote_descriptions().await,
        vec![pair.caller.offer()]
    );

    // Initiator sets its local offer before anything is published.
    let caller_calls = pair.caller.calls().await;
    assert_eq!(caller_calls[0], PeerCall::CreateOffer);
    assert_eq!(caller_calls[1], PeerCall::SetLocal(pair.caller.offer()));

    // Joiner applies the offer before producing its answer.
    let callee_calls = pair.callee.calls().await;
    assert_eq!(callee_calls[0], PeerCall::SetRemote(pair.caller.offer()));
    assert_eq!(callee_calls[1], PeerCall::CreateAnswer);
    assert_eq!(callee_calls[2], PeerCall::SetLocal(pair.callee.answer()));

    let path = dispatcher.rooms().path(pair.caller_handle.room_id());
    let fields = store.record(&path).expect("Room record missing");
    let record = RoomRecord::from_fields(fields).expect("Room record malformed");
    assert_eq!(record.offer, Some(pair.caller.offer()));
    assert_eq!(record.answer, Some(pair.callee.answer()));

    assert_eq!(pair.caller_handle.close().await, CallState::Closed);
    assert_eq!(pair.callee_handle.close().await, CallState::Closed);
    assert!(pair.caller.was_closed().await);
    assert!(pair.callee.was_closed().await);
}
