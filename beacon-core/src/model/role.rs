use crate::model::candidate::CandidateSide;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Creates the room and publishes the offer.
    Initiator,
    /// Attaches to an existing room and publishes the answer.
    Joiner,
}

impl Role {
    /// Side under which this role files its own candidates.
    pub fn local_side(self) -> CandidateSide {
        match self {
            Role::Initiator => CandidateSide::Caller,
            Role::Joiner => CandidateSide::Callee,
        }
    }

    pub fn remote_side(self) -> CandidateSide {
        self.local_side().opposite()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => f.write_str("initiator"),
            Role::Joiner => f.write_str("joiner"),
        }
    }
}
