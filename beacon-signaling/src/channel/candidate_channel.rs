use crate::channel::candidate_subscription::CandidateSubscription;
use crate::error::SignalingError;
use crate::store::{DocumentStore, StoreError, WatchTarget, record_path};
use beacon_core::{CandidateSide, IceCandidate, RoomId};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Per-room, per-side append-only candidate queues backed by store subcollections.
#[derive(Clone)]
pub struct CandidateChannel {
    store: Arc<dyn DocumentStore>,
    rooms_collection: String,
}

impl CandidateChannel {
    pub fn new(store: Arc<dyn DocumentStore>, rooms_collection: impl Into<String>) -> Self {
        Self {
            store,
            rooms_collection: rooms_collection.into(),
        }
    }

    pub fn path(&self, room_id: &RoomId, side: CandidateSide) -> String {
        format!(
            "{}/{}",
            record_path(&self.rooms_collection, room_id.as_str()),
            side.collection_name()
        )
    }

    pub async fn append(
        &self,
        room_id: &RoomId,
        side: CandidateSide,
        candidate: &IceCandidate,
    ) -> Result<(), SignalingError> {
        let path = self.path(room_id, side);
        self.store
            .append(&path, Value::String(candidate.0.clone()))
            .await
            .map_err(channel_error)?;
        debug!("Appended candidate to {}", path);
        Ok(())
    }

    /// Delivers candidates appended after this call, in append order.
    pub async fn subscribe_additions(
        &self,
        room_id: &RoomId,
        side: CandidateSide,
    ) -> Result<CandidateSubscription, SignalingError> {
        self.subscribe(room_id, side, false).await
    }

    /// Delivers the candidates already filed, then every later append, in order.
    pub async fn subscribe_with_backlog(
        &self,
        room_id: &RoomId,
        side: CandidateSide,
    ) -> Result<CandidateSubscription, SignalingError> {
        self.subscribe(room_id, side, true).await
    }

    async fn subscribe(
        &self,
        room_id: &RoomId,
        side: CandidateSide,
        backlog: bool,
    ) -> Result<CandidateSubscription, SignalingError> {
        let path = self.path(room_id, side);
        let target = if backlog {
            WatchTarget::AdditionsWithBacklog(path.clone())
        } else {
            WatchTarget::Additions(path.clone())
        };
        let watch = self.store.subscribe(target).await.map_err(channel_error)?;
        Ok(CandidateSubscription::new(path, watch))
    }
}

fn channel_error(e: StoreError) -> SignalingError {
    SignalingError::ChannelUnavailable(e.to_string())
}
