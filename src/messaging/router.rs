use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::SimulationError;
use crate::messaging::message::Message;

pub type Handler<M> = Arc<dyn Fn(&M) -> Result<(), SimulationError> + Send + Sync>;

/// Delivery counters, observable without touching the publish path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub published: u64,
    pub undelivered: u64,
    pub handler_failures: u64,
}

/// Topic-keyed publish/subscribe dispatcher.
///
/// Delivery is synchronous and follows subscription order. Each publish
/// iterates over a snapshot of the topic's handlers taken under the table
/// lock, and the lock is released before any handler runs, so handlers may
/// publish or subscribe re-entrantly and other threads may register while a
/// delivery is in flight. A new subscription becomes visible from the next
/// publish onwards.
///
/// A handler that returns an error or panics is logged and counted; the
/// publisher never sees the failure and the remaining handlers still run.
pub struct MessageRouter<M = Message> {
    topics: RwLock<HashMap<String, Vec<Handler<M>>>>,
    published: AtomicU64,
    undelivered: AtomicU64,
    handler_failures: AtomicU64,
}

impl<M> MessageRouter<M> {
    pub fn new() -> Self {
        MessageRouter {
            topics: RwLock::new(HashMap::new()),
            published: AtomicU64::new(0),
            undelivered: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
        }
    }

    /// Registers `handler` for `topic`. Subscribing the same handler twice
    /// delivers twice.
    pub fn subscribe<F>(&self, topic: &str, handler: F)
    where
        F: Fn(&M) -> Result<(), SimulationError> + Send + Sync + 'static,
    {
        let count = {
            let mut topics = self.write_table();
            let handlers = topics.entry(topic.to_string()).or_default();
            handlers.push(Arc::new(handler));
            handlers.len()
        };
        log::debug!("New subscription on topic '{}' ({} total)", topic, count);
    }

    /// Delivers `message` to every handler of `topic` in subscription order
    /// and returns how many handlers were invoked.
    pub fn publish(&self, topic: &str, message: M) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);

        let handlers: Vec<Handler<M>> = match self.read_table().get(topic) {
            Some(handlers) => handlers.clone(),
            None => Vec::new(),
        };

        if handlers.is_empty() {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
            log::debug!("Topic '{}' has no subscribers", topic);
            return 0;
        }

        for (index, handler) in handlers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(&message))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.handler_failures.fetch_add(1, Ordering::Relaxed);
                    log::error!(
                        "Failed to deliver message on '{}' to handler #{}: {}",
                        topic,
                        index,
                        e
                    );
                }
                Err(payload) => {
                    self.handler_failures.fetch_add(1, Ordering::Relaxed);
                    log::error!(
                        "Handler #{} on '{}' panicked: {}",
                        index,
                        topic,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        log::trace!("Published on '{}' to {} handler(s)", topic, handlers.len());
        handlers.len()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.read_table().get(topic).map_or(0, Vec::len)
    }

    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.read_table().keys().cloned().collect();
        topics.sort();
        topics
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            published: self.published.load(Ordering::Relaxed),
            undelivered: self.undelivered.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }

    // The table lock is never held while a handler runs, so poisoning can only
    // come from a panic inside the map itself; the data is still consistent.
    fn read_table(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Handler<M>>>> {
        self.topics.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Handler<M>>>> {
        self.topics.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<M> Default for MessageRouter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for MessageRouter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRouter")
            .field("topics", &self.topics())
            .field("stats", &self.stats())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
