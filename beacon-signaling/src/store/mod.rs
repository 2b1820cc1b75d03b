//! Narrow view of the external document store: records, append-only
//! subcollections, and change feeds over both.

mod document_store;
mod memory;
mod watch;

pub use document_store::*;
pub use memory::MemoryStore;
pub use watch::{StoreEvent, Watch};
