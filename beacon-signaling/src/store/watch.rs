use crate::store::document_store::Fields;
use serde_json::Value;
use std::fmt;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Current state of a watched record; `None` once it no longer exists.
    Snapshot(Option<Fields>),
    /// An entry appended to a watched collection.
    Added(Value),
}

type Unregister = Box<dyn FnOnce() + Send + Sync>;

/// Live registration on a store change feed.
///
/// The owner must cancel it when done; dropping it cancels as well.
pub struct Watch {
    events: mpsc::UnboundedReceiver<StoreEvent>,
    unregister: Option<Unregister>,
}

impl Watch {
    /// `unregister` is invoked exactly once, on the first `cancel` or on drop.
    pub fn new<F>(events: mpsc::UnboundedReceiver<StoreEvent>, unregister: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            events,
            unregister: Some(Box::new(unregister)),
        }
    }

    /// Next event, or `None` once the watch is cancelled or the feed ends.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        if self.unregister.is_none() {
            return None;
        }
        self.events.recv().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.unregister.is_none()
    }

    pub fn cancel(&mut self) {
        let Some(unregister) = self.unregister.take() else {
            return;
        };
        unregister();
        self.events.close();
        // Drop anything that was queued before the registration went away.
        while self.events.try_recv().is_ok() {}
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
