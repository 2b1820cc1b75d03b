use crate::channel::CandidateChannel;
use crate::config::SignalingConfig;
use crate::coordinator::{CallHandle, CallState, SignalingCoordinator};
use crate::error::SignalingError;
use crate::peer::LocalPeer;
use crate::room::RoomRecords;
use crate::store::DocumentStore;
use beacon_core::RoomId;
use std::sync::Arc;
use tracing::info;

/// Entry point for calls: picks the initiating or joining role and hands the
/// local peer to a fresh coordinator. Holds no per-call state, so calls started
/// through the same dispatcher are independent.
#[derive(Clone)]
pub struct RoleDispatcher {
    rooms: RoomRecords,
    channel: CandidateChannel,
    config: SignalingConfig,
}

impl RoleDispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, config: SignalingConfig) -> Self {
        Self {
            rooms: RoomRecords::new(store.clone(), config.rooms_collection.clone()),
            channel: CandidateChannel::new(store, config.rooms_collection.clone()),
            config,
        }
    }

    pub fn rooms(&self) -> &RoomRecords {
        &self.rooms
    }

    pub fn channel(&self) -> &CandidateChannel {
        &self.channel
    }

    pub fn config(&self) -> &SignalingConfig {
        &self.config
    }

    /// No room id means we open a new room; a room id means we answer it.
    pub async fn start(
        &self,
        room_id: Option<RoomId>,
        peer: LocalPeer,
    ) -> Result<CallHandle, SignalingError> {
        match room_id {
            None => self.start_as_initiator(peer).await,
            Some(room_id) => self.start_as_joiner(room_id, peer).await,
        }
    }

    pub async fn start_as_initiator(&self, peer: LocalPeer) -> Result<CallHandle, SignalingError> {
        info!("Starting call as initiator");
        SignalingCoordinator::initiate(
            peer,
            self.rooms.clone(),
            self.channel.clone(),
            self.config.clone(),
        )
        .await
    }

    pub async fn start_as_joiner(
        &self,
        room_id: RoomId,
        peer: LocalPeer,
    ) -> Result<CallHandle, SignalingError> {
        info!("Joining room {}", room_id);
        SignalingCoordinator::join(
            room_id,
            peer,
            self.rooms.clone(),
            self.channel.clone(),
            self.config.clone(),
        )
        .await
    }

    /// Opens a room for `peer`. The room id is available through the handle.
    pub async fn create_call(&self, peer: LocalPeer) -> Result<CallHandle, SignalingError> {
        self.start_as_initiator(peer).await
    }

    /// Answers the call waiting in `room_id`.
    ///
    /// Fails with `RoomNotFound` when there is no such room and with
    /// `AlreadyAnswered` when another joiner got there first.
    pub async fn join_call(
        &self,
        room_id: &RoomId,
        peer: LocalPeer,
    ) -> Result<CallHandle, SignalingError> {
        self.start_as_joiner(room_id.clone(), peer).await
    }

    pub async fn close_call(&self, handle: &CallHandle) -> CallState {
        handle.close().await
    }
}
