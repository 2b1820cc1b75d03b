use crate::error::SignalingError;
use crate::store::{StoreEvent, Watch};
use beacon_core::IceCandidate;
use serde_json::Value;
use tracing::warn;

#[derive(Debug)]
pub struct CandidateSubscription {
    path: String,
    watch: Watch,
}

impl CandidateSubscription {
    pub(crate) fn new(path: String, watch: Watch) -> Self {
        Self { path, watch }
    }

    /// Next delivered candidate; `None` once cancelled or the feed ended.
    pub async fn recv(&mut self) -> Option<Result<IceCandidate, SignalingError>> {
        loop {
            match self.watch.recv().await? {
                StoreEvent::Added(Value::String(payload)) => {
                    return Some(Ok(IceCandidate(payload)));
                }
                StoreEvent::Added(other) => {
                    return Some(Err(SignalingError::malformed(
                        &self.path,
                        format!("candidate entry is not a string: {}", other),
                    )));
                }
                StoreEvent::Snapshot(_) => {
                    warn!("Ignoring record snapshot on candidate feed {}", self.path);
                }
            }
        }
    }

    pub fn cancel(&mut self) {
        self.watch.cancel();
    }
}
