use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque connectivity candidate descriptor.
///
/// The payload is whatever the peer-connection engine produced (for webrtc
/// this is the JSON form of `RTCIceCandidateInit`); signaling never looks inside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct IceCandidate(pub String);

impl IceCandidate {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which peer filed a candidate. Each side has its own subcollection under the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSide {
    Caller,
    Callee,
}

impl CandidateSide {
    pub fn collection_name(self) -> &'static str {
        match self {
            CandidateSide::Caller => "callerCandidates",
            CandidateSide::Callee => "calleeCandidates",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            CandidateSide::Caller => CandidateSide::Callee,
            CandidateSide::Callee => CandidateSide::Caller,
        }
    }
}

impl fmt::Display for CandidateSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}
