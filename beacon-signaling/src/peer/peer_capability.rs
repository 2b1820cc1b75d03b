use crate::error::CapabilityError;
use async_trait::async_trait;
use beacon_core::{IceCandidate, SessionDescription};

/// The local peer-connection engine as seen by signaling.
///
/// Implementations report what they discover (candidates, state changes,
/// remote tracks) as [`PeerEvent`](crate::PeerEvent)s on the channel they were
/// created with.
#[async_trait]
pub trait PeerCapability: Send + Sync + 'static {
    async fn create_offer(&self) -> Result<SessionDescription, CapabilityError>;

    async fn create_answer(&self) -> Result<SessionDescription, CapabilityError>;

    async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), CapabilityError>;

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), CapabilityError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), CapabilityError>;

    async fn close(&self) -> Result<(), CapabilityError>;

    /// Whether remote candidates may be handed over before the remote
    /// description is set. When `false` the coordinator holds them back.
    fn buffers_early_candidates(&self) -> bool {
        false
    }
}
