use beacon_core::{IceCandidate, Role};
use std::collections::VecDeque;

/// Signaling bookkeeping for one peer connection.
#[derive(Debug)]
pub(crate) struct LocalSession {
    role: Role,
    remote_description_set: bool,
    pending: VecDeque<IceCandidate>,
}

impl LocalSession {
    pub(crate) fn new(role: Role) -> Self {
        Self {
            role,
            remote_description_set: false,
            pending: VecDeque::new(),
        }
    }

    pub(crate) fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    pub(crate) fn mark_remote_description_set(&mut self) {
        self.remote_description_set = true;
    }

    /// Hands the candidate back if it can go to the engine now, otherwise queues it
    /// until the remote description is set.
    pub(crate) fn admit(
        &mut self,
        candidate: IceCandidate,
        engine_buffers: bool,
    ) -> Option<IceCandidate> {
        if self.remote_description_set || engine_buffers {
            return Some(candidate);
        }
        self.pending.push_back(candidate);
        None
    }

    /// Queued candidates in arrival order.
    pub(crate) fn take_pending(&mut self) -> VecDeque<IceCandidate> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }
}
