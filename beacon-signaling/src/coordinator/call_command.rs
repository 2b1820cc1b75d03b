/// Commands a [`CallHandle`](crate::CallHandle) sends to its call task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCommand {
    /// Explicit hangup: cancel subscriptions, close the peer connection.
    Hangup,
}
