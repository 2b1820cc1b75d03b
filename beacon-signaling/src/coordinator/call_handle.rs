use crate::coordinator::call_command::CallCommand;
use crate::coordinator::call_state::CallState;
use crate::error::SignalingError;
use beacon_core::{Role, RoomId};
use tokio::sync::{mpsc, watch};

/// Caller's view of a running call.
///
/// Clones share the same call. When the last clone is dropped the call hangs up.
#[derive(Clone)]
pub struct CallHandle {
    room_id: RoomId,
    role: Role,
    state: watch::Receiver<CallState>,
    commands: mpsc::Sender<CallCommand>,
}

impl CallHandle {
    pub(crate) fn new(
        room_id: RoomId,
        role: Role,
        state: watch::Receiver<CallState>,
        commands: mpsc::Sender<CallCommand>,
    ) -> Self {
        Self {
            room_id,
            role,
            state,
            commands,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> CallState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition of the call.
    pub fn watch_state(&self) -> watch::Receiver<CallState> {
        self.state.clone()
    }

    /// Resolves once the call is connected, or with the cause if it ended first.
    pub async fn wait_for_connected(&self) -> Result<(), SignalingError> {
        let state = self
            .wait_until(|s| matches!(s, CallState::Connected) || s.is_terminal())
            .await;
        match state {
            CallState::Connected => Ok(()),
            CallState::Failed(e) => Err(e),
            _ => Err(SignalingError::Closed),
        }
    }

    /// Resolves with the terminal state once the call has ended.
    pub async fn closed(&self) -> CallState {
        self.wait_until(CallState::is_terminal).await
    }

    /// Hangs up and waits for the call task to finish tearing down.
    /// Calling it again, or after the call failed, returns the terminal state.
    pub async fn close(&self) -> CallState {
        let current = self.state();
        if current.is_terminal() {
            return current;
        }
        // A send error means the task already exited and published its final state.
        let _ = self.commands.send(CallCommand::Hangup).await;
        self.closed().await
    }

    async fn wait_until<F>(&self, mut predicate: F) -> CallState
    where
        F: FnMut(&CallState) -> bool,
    {
        let mut rx = self.state.clone();
        let result = rx.wait_for(|s| predicate(s)).await.map(|s| s.clone());
        match result {
            Ok(state) => state,
            Err(_) => rx.borrow().clone(),
        }
    }
}
