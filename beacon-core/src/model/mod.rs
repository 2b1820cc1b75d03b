mod candidate;
mod description;
mod record;
mod role;
mod room;
mod signaling;

pub use candidate::{CandidateSide, IceCandidate};
pub use description::{SdpType, SessionDescription};
pub use record::{Room, RoomRecord};
pub use role::Role;
pub use room::RoomId;
pub use signaling::IceServerConfig;
