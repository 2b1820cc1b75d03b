use std::time::Duration;

use beacon_core::{CandidateSide, IceCandidate};

use crate::integration::{create_test_dispatcher, fast_config, init_tracing};
use crate::utils::{CANDIDATE_TIMEOUT_MS, MockPeer, PeerCall};

#[tokio::test]
async fn test_early_candidate_waits_for_answer() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());

    let (caller, caller_local) = MockPeer::new("caller");
    let caller_handle = dispatcher.create_call(caller_local).await.unwrap();
    let room_id = caller_handle.room_id().clone();

    // A callee candidate shows up before any answer exists.
    let early = IceCandidate::new("early");
    dispatcher
        .channel()
        .append(&room_id, CandidateSide::Callee, &early)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(caller.added_candidates().await.is_empty());

    let (callee, callee_local) = MockPeer::new("callee");
    let _callee_handle = dispatcher.join_call(&room_id, callee_local).await.unwrap();

    let added = caller.wait_for_candidates(1, CANDIDATE_TIMEOUT_MS).await;
    assert_eq!(added, vec![early.clone()]);

    // Flushed only after the answer was applied.
    let calls = caller.calls().await;
    let set_remote = calls
        .iter()
        .position(|c| *c == PeerCall::SetRemote(callee.answer()))
        .expect("Answer never applied");
    let add = calls
        .iter()
        .position(|c| *c == PeerCall::AddCandidate(early.clone()))
        .expect("Candidate never added");
    assert!(set_remote < add);
}

#[tokio::test]
async fn test_buffering_engine_gets_early_candidates_immediately() {
    init_tracing();

    let (dispatcher, _store) = create_test_dispatcher(fast_config());

    let (caller, caller_local) = MockPeer::buffering("caller");
    let caller_handle = dispatcher.create_call(caller_local).await.unwrap();

    let early = IceCandidate::new("early");
    dispatcher
        .channel()
        .append(caller_handle.room_id(), CandidateSide::Callee, &early)
        .await
        .unwrap();

    let added = caller.wait_for_candidates(1, CANDIDATE_TIMEOUT_MS).await;
    assert_eq!(added, vec![early]);
    assert!(caller.remote_descriptions().await.is_empty());
}
