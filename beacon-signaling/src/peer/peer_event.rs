use beacon_core::IceCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a peer-connection engine emits while negotiating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// A local candidate was gathered and must be trickled to the remote peer.
    IceCandidate(IceCandidate),

    /// Candidate gathering finished (the engine's empty candidate).
    IceGatheringComplete,

    /// A remote media track arrived.
    Track { id: String, kind: String },

    ConnectionState(PeerConnectionState),

    IceGatheringState(String),

    IceConnectionState(String),

    SignalingState(String),
}
