mod room_records;
mod room_subscription;

pub use room_records::RoomRecords;
pub use room_subscription::{RoomSubscription, RoomUpdate};
