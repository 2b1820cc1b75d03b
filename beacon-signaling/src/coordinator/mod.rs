mod call_command;
mod call_handle;
mod call_state;
mod candidate_publisher;
mod coordinator;
mod session;

pub use call_command::CallCommand;
pub use call_handle::CallHandle;
pub use call_state::CallState;
pub(crate) use coordinator::SignalingCoordinator;
