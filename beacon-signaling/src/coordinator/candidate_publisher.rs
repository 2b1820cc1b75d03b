use crate::channel::CandidateChannel;
use crate::config::RetryPolicy;
use crate::error::SignalingError;
use crate::retry::with_retry;
use beacon_core::{CandidateSide, IceCandidate, RoomId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Files local candidates from a task of its own so retry backoff never
/// stalls the call loop. Appends happen one at a time, in gathering order.
/// Candidates that still fail after retrying are reported back.
pub(crate) struct CandidatePublisher {
    queue: mpsc::UnboundedSender<IceCandidate>,
    task: JoinHandle<()>,
}

impl CandidatePublisher {
    pub(crate) fn spawn(
        channel: CandidateChannel,
        room_id: RoomId,
        side: CandidateSide,
        retry: RetryPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<SignalingError>) {
        let (queue, mut pending) = mpsc::unbounded_channel::<IceCandidate>();
        let (failure_tx, failure_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while let Some(candidate) = pending.recv().await {
                let result = with_retry(&retry, "candidate append", || {
                    channel.append(&room_id, side, &candidate)
                })
                .await;

                match result {
                    Ok(()) => debug!("Published local candidate for room {}", room_id),
                    Err(e) => {
                        if failure_tx.send(e).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        (Self { queue, task }, failure_rx)
    }

    pub(crate) fn publish(&self, candidate: IceCandidate) {
        // Only fails once the task is gone, i.e. after `stop`.
        let _ = self.queue.send(candidate);
    }

    /// Abandons queued and in-flight appends.
    pub(crate) fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for CandidatePublisher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
