use crate::error::SignalingError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallState {
    Idle,
    AwaitingLocalDescription,
    /// Offer published, waiting for the joiner's answer.
    AwaitingRemoteDescription,
    /// Both descriptions are in place; waiting for the engine to report connectivity.
    Connecting,
    Connected,
    Closed,
    Failed(SignalingError),
}

impl CallState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Closed | CallState::Failed(_))
    }
}
