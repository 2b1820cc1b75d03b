mod local_peer;
mod peer_capability;
mod peer_event;

pub use local_peer::LocalPeer;
pub use peer_capability::PeerCapability;
pub use peer_event::{PeerConnectionState, PeerEvent};
