use crate::error::CapabilityError;
use crate::peer::{LocalPeer, PeerCapability, PeerConnectionState, PeerEvent};
use crate::transport::transport_config::TransportConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use beacon_core::{IceCandidate, SdpType, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_gatherer_state::RTCIceGathererState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

/// [`PeerCapability`] backed by a webrtc-rs `RTCPeerConnection`.
///
/// webrtc-rs refuses remote candidates until a remote description is set, so
/// the coordinator queues early candidates for this engine.
pub struct WebRtcPeer {
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcPeer {
    /// Builds a peer connection whose callbacks report into `event_tx`.
    pub async fn new(config: &TransportConfig, event_tx: mpsc::Sender<PeerEvent>) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .filter(|server| !server.urls.is_empty())
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ice_candidate_pool_size: config.ice_candidate_pool_size,
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    let state = match s {
                        RTCPeerConnectionState::New => PeerConnectionState::New,
                        RTCPeerConnectionState::Connecting => PeerConnectionState::Connecting,
                        RTCPeerConnectionState::Connected => PeerConnectionState::Connected,
                        RTCPeerConnectionState::Disconnected => PeerConnectionState::Disconnected,
                        RTCPeerConnectionState::Failed => PeerConnectionState::Failed,
                        RTCPeerConnectionState::Closed => PeerConnectionState::Closed,
                        _ => return,
                    };
                    let _ = tx.send(PeerEvent::ConnectionState(state)).await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else {
                    let _ = tx.send(PeerEvent::IceGatheringComplete).await;
                    return;
                };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(str_candidate) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                let _ = tx
                    .send(PeerEvent::IceCandidate(IceCandidate(str_candidate)))
                    .await;
            })
        }));

        let track_tx = event_tx.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();

                Box::pin(async move {
                    let event = PeerEvent::Track {
                        id: track.id(),
                        kind: track.kind().to_string(),
                    };
                    let _ = tx.send(event).await;
                })
            },
        ));

        let gathering_tx = event_tx.clone();
        peer_connection.on_ice_gathering_state_change(Box::new(
            move |s: RTCIceGathererState| {
                let tx = gathering_tx.clone();

                Box::pin(async move {
                    let _ = tx.send(PeerEvent::IceGatheringState(s.to_string())).await;
                })
            },
        ));

        let ice_state_tx = event_tx.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = ice_state_tx.clone();

                Box::pin(async move {
                    let _ = tx.send(PeerEvent::IceConnectionState(s.to_string())).await;
                })
            },
        ));

        let signaling_tx = event_tx;
        peer_connection.on_signaling_state_change(Box::new(move |s: RTCSignalingState| {
            let tx = signaling_tx.clone();

            Box::pin(async move {
                let _ = tx.send(PeerEvent::SignalingState(s.to_string())).await;
            })
        }));

        Ok(Self { peer_connection })
    }

    /// Creates a peer together with the [`LocalPeer`] that hands it to signaling.
    /// The returned `Arc` stays usable for media setup before the call starts.
    pub async fn open(config: &TransportConfig) -> Result<(Arc<Self>, LocalPeer)> {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer.max(1));
        let peer = Arc::new(Self::new(config, event_tx).await?);
        let local = LocalPeer::new(peer.clone(), event_rx);
        Ok((peer, local))
    }

    /// Adds a data channel so the offer has something to negotiate.
    pub async fn create_data_channel(&self, label: &str) -> Result<Arc<RTCDataChannel>> {
        let dc = self
            .peer_connection
            .create_data_channel(label, None)
            .await
            .context("Failed to create data channel")?;
        debug!("Created data channel '{}'", label);
        Ok(dc)
    }

    pub fn peer_connection(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }
}

fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, webrtc::Error> {
    match desc.kind {
        SdpType::Offer => RTCSessionDescription::offer(desc.sdp),
        SdpType::Answer => RTCSessionDescription::answer(desc.sdp),
    }
}

#[async_trait]
impl PeerCapability for WebRtcPeer {
    async fn create_offer(&self) -> Result<SessionDescription, CapabilityError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| CapabilityError::new("create_offer", e))?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, CapabilityError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| CapabilityError::new("create_answer", e))?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), CapabilityError> {
        let desc = to_rtc(desc).map_err(|e| CapabilityError::new("set_local_description", e))?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(|e| CapabilityError::new("set_local_description", e))
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), CapabilityError> {
        let desc = to_rtc(desc).map_err(|e| CapabilityError::new("set_remote_description", e))?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| CapabilityError::new("set_remote_description", e))
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), CapabilityError> {
        let candidate: RTCIceCandidateInit = serde_json::from_str(candidate.as_str())
            .map_err(|e| CapabilityError::new("add_ice_candidate", e))?;
        self.peer_connection
            .add_ice_candidate(candidate)
            .await
            .map_err(|e| CapabilityError::new("add_ice_candidate", e))
    }

    async fn close(&self) -> Result<(), CapabilityError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| CapabilityError::new("close", e))
    }
}
