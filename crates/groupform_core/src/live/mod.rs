//! Live collections: full-snapshot fan-out to subscribers.
//!
//! # Responsibility
//! - Deliver the current contents of a collection to every subscriber on
//!   subscribe and after every change.
//! - Unregister subscribers deterministically when their handle is dropped.
//!
//! # Invariants
//! - A new subscriber first receives the latest published event, if any.
//! - Events are full snapshots, never deltas.
//! - A dropped or cancelled `Subscription` receives nothing further and is
//!   removed from the registry.

mod store;

pub use store::LiveRegistrationStore;

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// One notification from a live collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent<T> {
    /// Complete current contents of the collection.
    Snapshot(Vec<T>),
    /// Refresh failed; carries a display message for the viewer.
    Failed(String),
}

struct Registry<T> {
    next_id: u64,
    subscribers: BTreeMap<u64, Sender<LiveEvent<T>>>,
    latest: Option<LiveEvent<T>>,
}

/// Publishes snapshot events to any number of subscribers.
pub struct Broadcaster<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                subscribers: BTreeMap::new(),
                latest: None,
            })),
        }
    }
}

impl<T: Clone> Broadcaster<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber; it immediately receives the latest event.
    pub fn subscribe(&self) -> Subscription<T> {
        let (sender, receiver) = mpsc::channel();
        let mut registry = lock(&self.registry);
        if let Some(latest) = registry.latest.clone() {
            // Receiver is alive in this scope.
            let _ = sender.send(latest);
        }
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, sender);

        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Sends `event` to every subscriber and remembers it as the latest.
    ///
    /// Subscribers whose receiving side is gone are pruned.
    pub fn publish(&self, event: LiveEvent<T>) {
        let mut registry = lock(&self.registry);
        registry
            .subscribers
            .retain(|_, sender| sender.send(event.clone()).is_ok());
        registry.latest = Some(event);
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }

    /// Latest published event, if any.
    pub fn latest(&self) -> Option<LiveEvent<T>> {
        lock(&self.registry).latest.clone()
    }
}

/// Cancellable handle producing the event sequence of one collection.
///
/// Iterating blocks until the next event; the sequence ends only once the
/// publishing side is gone.
pub struct Subscription<T> {
    id: u64,
    receiver: Receiver<LiveEvent<T>>,
    registry: Weak<Mutex<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// Blocks for the next event. Returns `None` once the publisher is gone.
    pub fn recv(&self) -> Option<LiveEvent<T>> {
        self.receiver.recv().ok()
    }

    /// Returns the next pending event without blocking.
    pub fn try_recv(&self) -> Option<LiveEvent<T>> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LiveEvent<T>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains pending events and returns only the newest one.
    pub fn latest_pending(&self) -> Option<LiveEvent<T>> {
        self.receiver.try_iter().last()
    }

    /// Unregisters this subscription.
    pub fn cancel(self) {}
}

impl<T> Iterator for Subscription<T> {
    type Item = LiveEvent<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).subscribers.remove(&self.id);
        }
    }
}

fn lock<T>(registry: &Mutex<Registry<T>>) -> MutexGuard<'_, Registry<T>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::{Broadcaster, LiveEvent};
    use std::time::Duration;

    #[test]
    fn new_subscriber_receives_latest_snapshot_first() {
        let broadcaster = Broadcaster::new();
        broadcaster.publish(LiveEvent::Snapshot(vec![1, 2]));

        let subscription = broadcaster.subscribe();
        assert_eq!(subscription.try_recv(), Some(LiveEvent::Snapshot(vec![1, 2])));
        assert_eq!(subscription.try_recv(), None);

        broadcaster.publish(LiveEvent::Snapshot(vec![1, 2, 3]));
        assert_eq!(
            subscription.try_recv(),
            Some(LiveEvent::Snapshot(vec![1, 2, 3]))
        );
    }

    #[test]
    fn dropping_subscription_unregisters_it() {
        let broadcaster: Broadcaster<u8> = Broadcaster::new();
        let first = broadcaster.subscribe();
        let second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(first);
        assert_eq!(broadcaster.subscriber_count(), 1);
        second.cancel();
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn sequence_ends_when_publisher_is_dropped() {
        let broadcaster = Broadcaster::new();
        let mut subscription = broadcaster.subscribe();
        broadcaster.publish(LiveEvent::<u8>::Failed("offline".to_string()));
        drop(broadcaster);

        assert_eq!(
            subscription.next(),
            Some(LiveEvent::Failed("offline".to_string()))
        );
        assert_eq!(subscription.next(), None);
    }

    #[test]
    fn latest_pending_skips_stale_events() {
        let broadcaster = Broadcaster::new();
        let subscription = broadcaster.subscribe();
        broadcaster.publish(LiveEvent::Snapshot(vec![1]));
        broadcaster.publish(LiveEvent::Snapshot(vec![2]));

        assert_eq!(
            subscription.latest_pending(),
            Some(LiveEvent::Snapshot(vec![2]))
        );
        assert_eq!(subscription.try_recv(), None);
    }

    #[test]
    fn latest_tracks_last_publish_and_recv_timeout_waits_for_it() {
        let broadcaster: Broadcaster<u8> = Broadcaster::new();
        assert_eq!(broadcaster.latest(), None);

        let subscription = broadcaster.subscribe();
        assert_eq!(subscription.recv_timeout(Duration::from_millis(10)), None);

        broadcaster.publish(LiveEvent::Snapshot(vec![7]));
        broadcaster.publish(LiveEvent::Failed("offline".to_string()));
        assert_eq!(
            broadcaster.latest(),
            Some(LiveEvent::Failed("offline".to_string()))
        );
        assert_eq!(
            subscription.recv_timeout(Duration::from_millis(10)),
            Some(LiveEvent::Snapshot(vec![7]))
        );
    }
}
