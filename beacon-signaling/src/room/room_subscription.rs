use crate::error::SignalingError;
use crate::store::{StoreEvent, Watch};
use beacon_core::{Room, RoomId, RoomRecord};
use tracing::warn;

/// Update of a watched room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomUpdate {
    /// The record exists; `room` is `None` while it has no offer yet.
    Changed(Option<Room>),
    Deleted,
}

/// Change feed of a single room record. Delivery is at-least-once, so the
/// same state may be reported repeatedly.
#[derive(Debug)]
pub struct RoomSubscription {
    room_id: RoomId,
    path: String,
    watch: Watch,
}

impl RoomSubscription {
    pub(crate) fn new(room_id: RoomId, path: String, watch: Watch) -> Self {
        Self {
            room_id,
            path,
            watch,
        }
    }

    /// `None` once the subscription is cancelled or the feed ended.
    pub async fn recv(&mut self) -> Option<Result<RoomUpdate, SignalingError>> {
        loop {
            match self.watch.recv().await? {
                StoreEvent::Snapshot(None) => return Some(Ok(RoomUpdate::Deleted)),
                StoreEvent::Snapshot(Some(fields)) => {
                    let update = RoomRecord::from_fields(fields)
                        .map(|record| {
                            RoomUpdate::Changed(Room::from_record(self.room_id.clone(), record))
                        })
                        .map_err(|e| SignalingError::malformed(&self.path, e));
                    return Some(update);
                }
                StoreEvent::Added(_) => {
                    warn!("Ignoring collection event on room feed {}", self.path);
                }
            }
        }
    }

    pub fn cancel(&mut self) {
        self.watch.cancel();
    }
}
