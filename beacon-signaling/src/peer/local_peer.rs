use crate::peer::peer_capability::PeerCapability;
use crate::peer::peer_event::PeerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A peer-connection capability together with the receiving end of its events.
/// One `LocalPeer` drives exactly one call.
pub struct LocalPeer {
    pub capability: Arc<dyn PeerCapability>,
    pub events: mpsc::Receiver<PeerEvent>,
}

impl LocalPeer {
    pub fn new(capability: Arc<dyn PeerCapability>, events: mpsc::Receiver<PeerEvent>) -> Self {
        Self { capability, events }
    }
}
