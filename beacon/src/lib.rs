pub use beacon_core::model::{IceCandidate, Role, RoomId, SessionDescription};

pub mod model {
    pub use beacon_core::model::*;
}

pub mod signaling {
    pub use beacon_signaling::*;
}
