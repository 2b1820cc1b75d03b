use beacon_core::IceServerConfig;
use serde::{Deserialize, Serialize};

/// ICE configuration for webrtc peer connections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Event channel capacity between the engine callbacks and the call task.
    pub event_buffer: usize,
    /// Candidates gathered ahead of the first offer or answer.
    pub ice_candidate_pool_size: u8,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun([
                "stun:stun1.l.google.com:19302",
                "stun:stun2.l.google.com:19302",
            ])],
            event_buffer: 256,
            ice_candidate_pool_size: 10,
        }
    }
}
