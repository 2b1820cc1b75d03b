use beacon_core::RoomId;
use thiserror::Error;

/// The peer-connection capability refused an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} rejected: {reason}")]
pub struct CapabilityError {
    pub operation: &'static str,
    pub reason: String,
}

impl CapabilityError {
    pub fn new(operation: &'static str, reason: impl ToString) -> Self {
        Self {
            operation,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalingError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("room {0} has no offer")]
    MissingOffer(RoomId),

    #[error("room {0} already has an answer")]
    AlreadyAnswered(RoomId),

    #[error("room storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("candidate channel unavailable: {0}")]
    ChannelUnavailable(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("malformed record at {path}: {reason}")]
    MalformedRecord { path: String, reason: String },

    #[error("call already closed")]
    Closed,
}

impl SignalingError {
    /// Transient backend failures are retried before the call is failed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SignalingError::StorageUnavailable(_) | SignalingError::ChannelUnavailable(_)
        )
    }

    pub(crate) fn malformed(path: impl Into<String>, err: impl ToString) -> Self {
        SignalingError::MalformedRecord {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
