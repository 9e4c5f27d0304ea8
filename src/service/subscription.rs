// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path subscriptions and bounded notification mailboxes.
//!
//! Every subscription owns a small bounded queue. The broker pushes into it
//! without ever waiting on the consumer: when the queue is full the oldest
//! pending notification is dropped and the subscription's "missed update"
//! marker is set.

use crate::domain::{Change, ChangeDetector, FieldPath};
use crate::ports::{Layered, PathSet};
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Default number of pending notifications kept per subscription.
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

struct MailboxState<T> {
    items: VecDeque<Change<T>>,
    live: bool,
    missed: bool,
}

/// Outcome of pushing one notification into a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Delivered,
    Overflowed,
    Closed,
}

pub(crate) struct Mailbox<T> {
    id: u64,
    path: FieldPath,
    capacity: usize,
    state: Mutex<MailboxState<T>>,
    ready: Condvar,
}

impl<T> Mailbox<T> {
    fn new(id: u64, path: FieldPath, capacity: usize) -> Self {
        Self {
            id,
            path,
            capacity: capacity.max(1),
            state: Mutex::new(MailboxState {
                items: VecDeque::new(),
                live: true,
                missed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Marks the mailbox dead and discards pending items.
    ///
    /// Returns true if this call performed the transition.
    fn close(&self) -> bool {
        let mut state = self.state.lock();
        let was_live = state.live;
        state.live = false;
        state.items.clear();
        drop(state);
        self.ready.notify_all();
        was_live
    }
}

impl<T: Layered> Mailbox<T> {
    /// Pushes a copy of `value`, dropping the oldest item if the queue is full.
    ///
    /// Liveness is checked under the same lock `close` takes, so nothing is
    /// delivered once `close` has returned.
    pub(crate) fn deliver(&self, value: &T) -> Delivery {
        let mut state = self.state.lock();
        if !state.live {
            return Delivery::Closed;
        }
        let mut outcome = Delivery::Delivered;
        if state.items.len() >= self.capacity {
            state.items.pop_front();
            state.missed = true;
            outcome = Delivery::Overflowed;
        }
        state.items.push_back(Change {
            path: self.path.clone(),
            value: value.deep_copy(),
        });
        drop(state);
        self.ready.notify_one();
        outcome
    }
}

struct RegistryShared<T> {
    next_id: AtomicU64,
    entries: Mutex<HashMap<FieldPath, Vec<Arc<Mailbox<T>>>>>,
}

impl<T> RegistryShared<T> {
    fn remove(&self, path: &FieldPath, id: u64) -> bool {
        let mut entries = self.entries.lock();
        let Some(mailboxes) = entries.get_mut(path) else {
            return false;
        };
        let before = mailboxes.len();
        mailboxes.retain(|m| m.id != id);
        let removed = mailboxes.len() != before;
        if mailboxes.is_empty() {
            entries.remove(path);
        }
        removed
    }
}

/// Counters describing one notification round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Distinct subscribed paths whose sub-value changed.
    pub changed_paths: usize,
    /// Notifications placed into mailboxes.
    pub delivered: usize,
    /// Deliveries that displaced an older pending notification.
    pub overflowed: usize,
}

/// Maps field paths to live subscriptions.
///
/// Adding and removing subscriptions only takes the registry's own short lock,
/// never the broker's write lock. A notification round works on a snapshot of
/// the registry, so unsubscribing never waits for a round to finish.
pub(crate) struct SubscriptionRegistry<T> {
    shared: Arc<RegistryShared<T>>,
}

impl<T: Layered> SubscriptionRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(RegistryShared {
                next_id: AtomicU64::new(1),
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Registers a new subscription at `path`.
    pub(crate) fn add(&self, path: FieldPath, capacity: usize) -> Subscription<T> {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let mailbox = Arc::new(Mailbox::new(id, path.clone(), capacity));
        self.shared
            .entries
            .lock()
            .entry(path)
            .or_default()
            .push(Arc::clone(&mailbox));

        Subscription {
            handle: Unsubscriber {
                mailbox: Arc::clone(&mailbox),
                registry: Arc::downgrade(&self.shared),
            },
            mailbox,
        }
    }

    /// Delivers `new` to every live subscription whose path changed.
    ///
    /// Nothing is delivered when `old` and `new` are equal under
    /// [`Layered::equal`].
    pub(crate) fn notify(&self, paths: &PathSet<T>, old: &T, new: &T) -> NotifyReport {
        if old.equal(new) {
            return NotifyReport::default();
        }
        let targets: Vec<(FieldPath, Vec<Arc<Mailbox<T>>>)> = self
            .shared
            .entries
            .lock()
            .iter()
            .map(|(path, mailboxes)| (path.clone(), mailboxes.clone()))
            .collect();

        let detector = ChangeDetector::new(paths);
        let changed = detector.changed_paths(targets.iter().map(|(path, _)| path), old, new);

        let mut report = NotifyReport {
            changed_paths: changed.len(),
            ..NotifyReport::default()
        };
        for (path, mailboxes) in targets.iter().filter(|(path, _)| changed.contains(&path)) {
            for mailbox in mailboxes {
                match mailbox.deliver(new) {
                    Delivery::Delivered => report.delivered += 1,
                    Delivery::Overflowed => {
                        report.delivered += 1;
                        report.overflowed += 1;
                        tracing::trace!(
                            "Subscription {} on '{}' overflowed; dropped oldest notification",
                            mailbox.id,
                            path
                        );
                    }
                    Delivery::Closed => {}
                }
            }
        }
        report
    }

    /// Closes and removes every subscription. Returns how many were live.
    pub(crate) fn close_all(&self) -> usize {
        let drained: Vec<Arc<Mailbox<T>>> = self
            .shared
            .entries
            .lock()
            .drain()
            .flat_map(|(_, mailboxes)| mailboxes)
            .collect();
        drained.iter().filter(|m| m.close()).count()
    }

    /// Returns the number of registered subscriptions.
    pub(crate) fn len(&self) -> usize {
        self.shared.entries.lock().values().map(Vec::len).sum()
    }
}

/// A handle that cancels one subscription.
///
/// Cloning the handle is cheap. Unsubscribing is idempotent and may be called
/// from any thread, including while a notification round is in progress.
pub struct Unsubscriber<T> {
    mailbox: Arc<Mailbox<T>>,
    registry: Weak<RegistryShared<T>>,
}

impl<T> Unsubscriber<T> {
    /// Cancels the subscription. Nothing is delivered after this returns.
    pub fn unsubscribe(&self) {
        if self.mailbox.close() {
            tracing::debug!(
                "Subscription {} on '{}' cancelled",
                self.mailbox.id,
                self.mailbox.path
            );
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.mailbox.path, self.mailbox.id);
        }
    }

    /// Returns true once the subscription has been cancelled or its broker closed.
    pub fn is_cancelled(&self) -> bool {
        !self.mailbox.state.lock().live
    }
}

impl<T> Clone for Unsubscriber<T> {
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
            registry: Weak::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for Unsubscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscriber")
            .field("id", &self.mailbox.id)
            .field("path", &self.mailbox.path)
            .finish()
    }
}

/// A stream of change notifications for one path.
///
/// Notifications arrive in mutation order, possibly coalesced when the
/// subscriber falls behind. Dropping the subscription unsubscribes it.
///
/// # Examples
///
/// ```rust,ignore
/// let subscription = broker.subscribe("Database.Host")?;
/// let cancel = subscription.unsubscriber();
///
/// std::thread::spawn(move || {
///     for change in subscription {
///         println!("{} changed", change.path);
///     }
/// });
///
/// // Later, from anywhere:
/// cancel.unsubscribe();
/// ```
pub struct Subscription<T> {
    mailbox: Arc<Mailbox<T>>,
    handle: Unsubscriber<T>,
}

impl<T> Subscription<T> {
    /// The path this subscription watches.
    pub fn path(&self) -> &FieldPath {
        &self.mailbox.path
    }

    /// Blocks until a notification arrives.
    ///
    /// Returns `None` once the subscription is cancelled or its broker closed.
    pub fn recv(&self) -> Option<Change<T>> {
        let mut state = self.mailbox.state.lock();
        loop {
            if let Some(change) = state.items.pop_front() {
                return Some(change);
            }
            if !state.live {
                return None;
            }
            self.mailbox.ready.wait(&mut state);
        }
    }

    /// Blocks for at most `timeout` waiting for a notification.
    ///
    /// A timeout too large to represent as a deadline blocks like [`recv`](Self::recv).
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Change<T>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.recv();
        };
        let mut state = self.mailbox.state.lock();
        loop {
            if let Some(change) = state.items.pop_front() {
                return Some(change);
            }
            if !state.live {
                return None;
            }
            if self
                .mailbox
                .ready
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.items.pop_front();
            }
        }
    }

    /// Returns a pending notification without blocking.
    pub fn try_recv(&self) -> Option<Change<T>> {
        self.mailbox.state.lock().items.pop_front()
    }

    /// Returns the number of notifications waiting to be received.
    pub fn pending(&self) -> usize {
        self.mailbox.state.lock().items.len()
    }

    /// Returns true if notifications were dropped since the last call, and
    /// resets the marker.
    pub fn take_missed(&self) -> bool {
        std::mem::take(&mut self.mailbox.state.lock().missed)
    }

    /// Returns true once the subscription has been cancelled or its broker closed.
    pub fn is_closed(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Returns a handle that can cancel this subscription from elsewhere.
    pub fn unsubscriber(&self) -> Unsubscriber<T> {
        self.handle.clone()
    }

    /// Cancels the subscription.
    pub fn unsubscribe(&self) {
        self.handle.unsubscribe();
    }
}

impl<T> Iterator for Subscription<T> {
    type Item = Change<T>;

    fn next(&mut self) -> Option<Change<T>> {
        self.recv()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.handle.unsubscribe();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.mailbox.id)
            .field("path", &self.mailbox.path)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ServerConfig;
    use std::thread;

    fn registry() -> SubscriptionRegistry<ServerConfig> {
        SubscriptionRegistry::new()
    }

    #[test]
    fn test_notify_only_changed_paths() {
        let registry = registry();
        let paths = ServerConfig::paths();
        let port = registry.add(FieldPath::from("Port"), 4);
        let name = registry.add(FieldPath::from("Name"), 4);

        let report = registry.notify(
            &paths,
            &ServerConfig::new("api", 80),
            &ServerConfig::new("api", 81),
        );

        assert_eq!(report.changed_paths, 1);
        assert_eq!(report.delivered, 1);
        let change = port.try_recv().unwrap();
        assert_eq!(change.path.as_str(), "Port");
        assert_eq!(change.value.port, 81);
        assert!(name.try_recv().is_none());
    }

    #[test]
    fn test_shared_path_reaches_every_subscriber() {
        let registry = registry();
        let paths = ServerConfig::paths();
        let a = registry.add(FieldPath::from("Name"), 4);
        let b = registry.add(FieldPath::from("Name"), 4);

        let report = registry.notify(
            &paths,
            &ServerConfig::new("api", 80),
            &ServerConfig::new("web", 80),
        );

        assert_eq!(report.changed_paths, 1);
        assert_eq!(report.delivered, 2);
        assert_eq!(a.pending(), 1);
        assert_eq!(b.pending(), 1);
    }

    #[test]
    fn test_overflow_drops_oldest_and_marks_missed() {
        let registry = registry();
        let paths = ServerConfig::paths();
        let sub = registry.add(FieldPath::from("Port"), 2);

        let mut previous = ServerConfig::new("api", 0);
        for port in 1..=3 {
            let next = ServerConfig::new("api", port);
            registry.notify(&paths, &previous, &next);
            previous = next;
        }

        assert!(sub.take_missed());
        assert!(!sub.take_missed());
        let ports: Vec<u16> = std::iter::from_fn(|| sub.try_recv())
            .map(|c| c.value.port)
            .collect();
        assert_eq!(ports, vec![2, 3]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery_and_is_idempotent() {
        let registry = registry();
        let paths = ServerConfig::paths();
        let sub = registry.add(FieldPath::from("Port"), 4);
        let handle = sub.unsubscriber();

        handle.unsubscribe();
        handle.unsubscribe();
        sub.unsubscribe();

        let report = registry.notify(
            &paths,
            &ServerConfig::new("api", 80),
            &ServerConfig::new("api", 81),
        );
        assert_eq!(report.delivered, 0);
        assert!(sub.is_closed());
        assert!(sub.recv().is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_mailbox_closed_after_snapshot_receives_nothing() {
        let registry = registry();
        let sub = registry.add(FieldPath::from("Port"), 4);
        let mailbox = Arc::clone(&sub.mailbox);

        sub.unsubscribe();
        assert_eq!(
            mailbox.deliver(&ServerConfig::new("api", 1)),
            Delivery::Closed
        );
        assert_eq!(sub.pending(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = registry();
        let sub = registry.add(FieldPath::from("Port"), 4);
        let handle = sub.unsubscriber();
        assert_eq!(registry.len(), 1);

        drop(sub);
        assert_eq!(registry.len(), 0);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_close_all() {
        let registry = registry();
        let a = registry.add(FieldPath::from("Port"), 4);
        let b = registry.add(FieldPath::from("Name"), 4);
        b.unsubscribe();

        assert_eq!(registry.close_all(), 1);
        assert!(a.is_closed());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_recv_timeout_expires() {
        let registry = registry();
        let sub = registry.add(FieldPath::from("Port"), 4);
        assert!(sub.recv_timeout(Duration::from_millis(20)).is_none());
        assert!(!sub.is_closed());
    }

    #[test]
    fn test_recv_timeout_unbounded_duration() {
        let registry = registry();
        let paths = ServerConfig::paths();
        let sub = registry.add(FieldPath::from("Port"), 4);

        registry.notify(
            &paths,
            &ServerConfig::new("api", 80),
            &ServerConfig::new("api", 81),
        );
        let change = sub.recv_timeout(Duration::MAX).unwrap();
        assert_eq!(change.value.port, 81);

        sub.unsubscribe();
        assert!(sub.recv_timeout(Duration::MAX).is_none());
    }

    #[test]
    fn test_recv_wakes_on_delivery() {
        let registry = Arc::new(registry());
        let sub = registry.add(FieldPath::from("Port"), 4);

        let notifier = Arc::clone(&registry);
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let paths = ServerConfig::paths();
            notifier.notify(
                &paths,
                &ServerConfig::new("api", 80),
                &ServerConfig::new("api", 81),
            );
        });

        let change = sub.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(change.value.port, 81);
        worker.join().unwrap();
    }

    #[test]
    fn test_recv_wakes_on_unsubscribe() {
        let registry = registry();
        let sub = registry.add(FieldPath::from("Port"), 4);
        let handle = sub.unsubscriber();

        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.unsubscribe();
        });

        assert!(sub.recv().is_none());
        worker.join().unwrap();
    }

    #[test]
    fn test_iterator_ends_when_closed() {
        let registry = registry();
        let paths = ServerConfig::paths();
        let sub = registry.add(FieldPath::from("Port"), 4);

        registry.notify(
            &paths,
            &ServerConfig::new("api", 80),
            &ServerConfig::new("api", 81),
        );
        let first = sub.try_recv();
        assert!(first.is_some());
        registry.close_all();

        assert_eq!(sub.count(), 0);
    }
}
