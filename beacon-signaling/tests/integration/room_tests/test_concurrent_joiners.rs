use beacon_core::RoomRecord;
use beacon_signaling::SignalingError;

use crate::integration::{create_test_dispatcher, fast_config, init_tracing};
use crate::utils::{MockPeer, connect_pair};

#[tokio::test]
async fn test_only_one_concurrent_joiner_wins() {
    init_tracing();

    let (dispatcher, store) = create_test_dispatcher(fast_config());

    let (_caller, caller_local) = MockPeer::new("caller");
    let caller_handle = dispatcher.create_call(caller_local).await.unwrap();
    let room_id = caller_handle.room_id().clone();

    let (alice, alice_local) = MockPeer::new("alice");
    let (bob, bob_local) = MockPeer::new("bob");

    let (alice_result, bob_result) = futures::future::join(
        dispatcher.join_call(&room_id, alice_local),
        dispatcher.join_call(&room_id, bob_local),
    )
    .await;

    assert!(
        alice_result.is_ok() != bob_result.is_ok(),
        "Expected exactly one joiner to succeed"
    );
    let (winner, loser, loser_result) = if alice_result.is_ok() {
        (&alice, &bob, bob_result)
    } else {
        (&bob, &alice, alice_result)
    };

    assert_eq!(
        loser_result.err(),
        Some(SignalingError::AlreadyAnswered(room_id.clone()))
    );
    assert!(loser.was_closed().await);

    let path = dispatcher.rooms().path(&room_id);
    let record = RoomRecord::from_fields(store.record(&path).unwrap()).unwrap();
    assert_eq!(record.answer, Some(winner.answer()));
}

#[tokio::test]
async fn test_join_after_answer_is_rejected() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());
    let pair = connect_pair(&dispatcher)
        .await
        .expect("Call did not connect");

    let (late, late_local) = MockPeer::new("late");
    let result = dispatcher
        .join_call(pair.caller_handle.room_id(), late_local)
        .await;

    assert_eq!(
        result.err(),
        Some(SignalingError::AlreadyAnswered(
            pair.caller_handle.room_id().clone()
        ))
    );
    // The late joiner never touched its engine's descriptions.
    assert!(late.remote_descriptions().await.is_empty());
    assert!(late.was_closed().await);
}
