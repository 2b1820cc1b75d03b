use anyhow::{Context, Result};
use beacon_signaling::{CallHandle, CallState, RoleDispatcher};
use std::time::Duration;

use super::mock_peer::MockPeer;

/// Timeout for a call to reach an expected state (ms).
pub const STATE_TIMEOUT_MS: u64 = 2000;

/// Timeout for candidates to travel through the store (ms).
pub const CANDIDATE_TIMEOUT_MS: u64 = 2000;

/// Wait until the call state satisfies `predicate`.
///
/// Returns the matching state, or `None` on timeout.
pub async fn wait_for_state<F>(
    handle: &CallHandle,
    timeout_ms: u64,
    predicate: F,
) -> Option<CallState>
where
    F: Fn(&CallState) -> bool,
{
    let mut rx = handle.watch_state();
    let waited =
        tokio::time::timeout(Duration::from_millis(timeout_ms), rx.wait_for(|s| predicate(s)))
            .await;

    match waited {
        Ok(Ok(state)) => Some(state.clone()),
        _ => None,
    }
}

/// A connected initiator/joiner pair driven by mocks.
pub struct ConnectedPair {
    pub caller: MockPeer,
    pub caller_handle: CallHandle,
    pub callee: MockPeer,
    pub callee_handle: CallHandle,
}

/// Run the whole offer/answer exchange and bring both transports up.
pub async fn connect_pair(dispatcher: &RoleDispatcher) -> Result<ConnectedPair> {
    let (caller, caller_local) = MockPeer::new("caller");
    let caller_handle = dispatcher
        .create_call(caller_local)
        .await
        .context("Failed to create call")?;

    let (callee, callee_local) = MockPeer::new("callee");
    let callee_handle = dispatcher
        .join_call(caller_handle.room_id(), callee_local)
        .await
        .context("Failed to join call")?;

    caller.connect().await;
    callee.connect().await;

    let timeout = Duration::from_millis(STATE_TIMEOUT_MS);
    tokio::time::timeout(timeout, caller_handle.wait_for_connected())
        .await
        .context("Caller did not connect in time")??;
    tokio::time::timeout(timeout, callee_handle.wait_for_connected())
        .await
        .context("Callee did not connect in time")??;

    Ok(ConnectedPair {
        caller,
        caller_handle,
        callee,
        callee_handle,
    })
}
