pub mod channel;
pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod peer;
pub mod retry;
pub mod room;
pub mod store;
pub mod transport;

pub use channel::*;
pub use config::*;
pub use coordinator::{CallHandle, CallState};
pub use dispatcher::*;
pub use error::*;
pub use peer::*;
pub use room::*;
pub use store::{DocumentStore, MemoryStore};
pub use transport::*;
