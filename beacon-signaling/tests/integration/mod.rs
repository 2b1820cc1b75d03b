//! Integration tests for beacon_signaling.
//!
//! Tests are organized by functionality:
//! - `connection_tests` - full calls between two peers
//! - `room_tests` - room lookup and answer races
//! - `candidate_tests` - candidate trickling and ordering
//! - `lifecycle_tests` - hangup, retries and teardown

pub mod candidate_tests;
pub mod room_tests;

use std::sync::Arc;
use tracing::Level;

use beacon_signaling::{MemoryStore, RetryPolicy, RoleDispatcher, SignalingConfig};

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Default config with millisecond backoff so retry tests stay fast.
pub fn fast_config() -> SignalingConfig {
    SignalingConfig {
        retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
        },
        ..Default::default()
    }
}

/// Create a dispatcher over a fresh in-memory store.
///
/// Returns (dispatcher, store) so tests can inspect records and inject failures.
pub fn create_test_dispatcher(config: SignalingConfig) -> (RoleDispatcher, MemoryStore) {
    let store = MemoryStore::new();
    let dispatcher = RoleDispatcher::new(Arc::new(store.clone()), config);
    (dispatcher, store)
}
