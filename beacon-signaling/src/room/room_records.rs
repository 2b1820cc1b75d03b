use crate::error::SignalingError;
use crate::room::room_subscription::RoomSubscription;
use crate::store::{DocumentStore, Precondition, StoreError, WatchTarget, record_path};
use beacon_core::{Room, RoomId, RoomRecord, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info};

/// Room records in the document store: one offer write by the initiator,
/// one answer write by the joiner.
#[derive(Clone)]
pub struct RoomRecords {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl RoomRecords {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn path(&self, room_id: &RoomId) -> String {
        record_path(&self.collection, room_id.as_str())
    }

    /// Reserves a room id with an empty record.
    pub async fn allocate(&self) -> Result<RoomId, SignalingError> {
        let id = self
            .store
            .create_record(&self.collection)
            .await
            .map_err(storage_error)?;
        debug!("Allocated room {}", id);
        Ok(RoomId(id))
    }

    /// Writes the offer with a full overwrite. Called once, right after `allocate`.
    pub async fn publish_offer(
        &self,
        room_id: &RoomId,
        offer: &SessionDescription,
    ) -> Result<(), SignalingError> {
        let record = RoomRecord::with_offer(offer.clone());
        self.store
            .set_fields(&self.path(room_id), record.to_fields())
            .await
            .map_err(storage_error)?;
        info!("Room {} created with offer", room_id);
        Ok(())
    }

    /// `allocate` followed by `publish_offer`, for callers that have the offer
    /// before they need the room id.
    pub async fn create_room(&self, offer: &SessionDescription) -> Result<RoomId, SignalingError> {
        let room_id = self.allocate().await?;
        self.publish_offer(&room_id, offer).await?;
        Ok(room_id)
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Result<Room, SignalingError> {
        let path = self.path(room_id);
        let Some(fields) = self.store.get_record(&path).await.map_err(storage_error)? else {
            return Err(SignalingError::RoomNotFound(room_id.clone()));
        };
        let record =
            RoomRecord::from_fields(fields).map_err(|e| SignalingError::malformed(&path, e))?;

        Room::from_record(room_id.clone(), record)
            .ok_or_else(|| SignalingError::MissingOffer(room_id.clone()))
    }

    /// Stores the joiner's answer.
    ///
    /// The read rejects missing and already answered rooms early; the conditional
    /// write settles races between joiners that both passed the read.
    pub async fn set_answer(
        &self,
        room_id: &RoomId,
        answer: &SessionDescription,
    ) -> Result<(), SignalingError> {
        let room = self.get_room(room_id).await?;
        if room.is_answered() {
            return Err(SignalingError::AlreadyAnswered(room_id.clone()));
        }

        let result = self
            .store
            .update_fields(
                &self.path(room_id),
                RoomRecord::answer_fields(answer),
                Precondition::FieldAbsent(RoomRecord::ANSWER_FIELD.to_owned()),
            )
            .await;

        match result {
            Ok(()) => {
                info!("Room {} answered", room_id);
                Ok(())
            }
            Err(StoreError::PreconditionFailed(_)) => {
                Err(SignalingError::AlreadyAnswered(room_id.clone()))
            }
            Err(StoreError::NotFound(_)) => Err(SignalingError::RoomNotFound(room_id.clone())),
            Err(e) => Err(storage_error(e)),
        }
    }

    pub async fn subscribe_room_updates(
        &self,
        room_id: &RoomId,
    ) -> Result<RoomSubscription, SignalingError> {
        let path = self.path(room_id);
        let watch = self
            .store
            .subscribe(WatchTarget::Record(path.clone()))
            .await
            .map_err(storage_error)?;
        Ok(RoomSubscription::new(room_id.clone(), path, watch))
    }
}

fn storage_error(e: StoreError) -> SignalingError {
    SignalingError::StorageUnavailable(e.to_string())
}
