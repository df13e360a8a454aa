//! Synchronous change notification shared by the word models and the cloud generator.
//!
//! Subscribers are invoked in registration order on the caller's thread. A callback
//! must not mutate the source it was notified from; there is no reentrancy guard.

use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    WordsChanged,
    StopWordsChanged,
    ImageReady,
    ChartReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Callback<S> = Box<dyn Fn(&S) + Send + Sync>;

struct Subscriber<S> {
    id: SubscriptionId,
    event: Event,
    callback: Callback<S>,
}

/// Ordered subscriber list keyed by event kind. `S` is the type handed to callbacks.
pub struct EventBus<S> {
    subscribers: Vec<Subscriber<S>>,
    next_id: u64,
}

impl<S> EventBus<S> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, event: Event, callback: F) -> SubscriptionId
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            event,
            callback: Box::new(callback),
        });
        id
    }

    /// Fails with `NotFound` when `id` was never registered or is already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<()> {
        let idx = self
            .subscribers
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("subscription {id} is not registered.")))?;
        self.subscribers.remove(idx);
        Ok(())
    }

    pub fn emit(&self, event: Event, source: &S) {
        for subscriber in self.subscribers.iter().filter(|s| s.event == event) {
            (subscriber.callback)(source);
        }
    }

    pub fn subscriber_count(&self, event: Event) -> usize {
        self.subscribers.iter().filter(|s| s.event == event).count()
    }
}

impl<S> Default for EventBus<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for EventBus<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
