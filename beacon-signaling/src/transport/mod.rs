mod transport_config;
mod webrtc_peer;

pub use transport_config::TransportConfig;
pub use webrtc_peer::WebRtcPeer;
