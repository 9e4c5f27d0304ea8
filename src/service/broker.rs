// SPDX-License-Identifier: MIT OR Apache-2.0

//! The layered configuration broker.
//!
//! This module provides `LayerBroker`, which holds a fixed stack of named
//! overlays for one configuration type, keeps the merged effective value
//! published for lock-free reads, and notifies path subscribers when a
//! mutation changes what they watch.

use crate::domain::{
    BoxError, BrokerError, EffectiveCalculator, FieldPath, LayerName, LayerStore, Result,
};
use crate::ports::{Layered, OverlaySource, PathSet};
use crate::service::subscription::{
    NotifyReport, Subscription, SubscriptionRegistry, DEFAULT_QUEUE_DEPTH,
};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A thread-safe broker over precedence-ordered configuration layers.
///
/// Mutations (`set_layer`, `clear_layer`, `transaction`, `load_layer`) are
/// serialized by a single write lock and each one runs a full
/// recompute-and-notify cycle before the lock is released. Reads (`get`) only
/// load the currently published value and copy it, so they never block and
/// never observe a partially merged value.
///
/// Share a broker between threads by wrapping it in an `Arc`.
///
/// # Examples
///
/// ```rust
/// use layerbroker::prelude::*;
/// # #[derive(Debug, Clone, PartialEq)]
/// # struct App { name: String, port: u16 }
/// # #[derive(Debug, Clone, Default)]
/// # struct AppPartial { name: Option<String>, port: Option<u16> }
/// # impl Layered for App {
/// #     type Partial = AppPartial;
/// #     fn merge(&self, o: &AppPartial) -> Self {
/// #         App {
/// #             name: o.name.clone().unwrap_or_else(|| self.name.clone()),
/// #             port: o.port.unwrap_or(self.port),
/// #         }
/// #     }
/// #     fn deep_copy(&self) -> Self { self.clone() }
/// #     fn copy_partial(o: &AppPartial) -> AppPartial { o.clone() }
/// #     fn equal(&self, other: &Self) -> bool { self == other }
/// #     fn paths() -> PathSet<Self> {
/// #         PathSet::new()
/// #             .field("Name", |a: &App| &a.name)
/// #             .field("Port", |a: &App| &a.port)
/// #     }
/// # }
///
/// # fn main() -> Result<()> {
/// let base = App { name: "default".into(), port: 8080 };
/// let broker = LayerBroker::new(["file", "env"], base)?;
///
/// broker.set_layer("file", AppPartial { port: Some(9090), ..Default::default() })?;
/// broker.set_layer("env", AppPartial { name: Some("from-env".into()), ..Default::default() })?;
/// assert_eq!(broker.get(), App { name: "from-env".into(), port: 9090 });
///
/// broker.clear_layer("env")?;
/// assert_eq!(broker.get(), App { name: "default".into(), port: 9090 });
/// # Ok(())
/// # }
/// ```
pub struct LayerBroker<T: Layered> {
    /// The write lock; every mutation and its notify round happens under it
    store: Mutex<LayerStore<T::Partial>>,
    /// Layer names in precedence order, fixed at construction
    names: Vec<LayerName>,
    calculator: EffectiveCalculator<T>,
    /// The published effective value, replaced wholesale on every mutation
    current: ArcSwap<T>,
    paths: PathSet<T>,
    registry: SubscriptionRegistry<T>,
    queue_depth: usize,
    closed: AtomicBool,
}

impl<T: Layered> LayerBroker<T> {
    /// Creates a broker with the given layer names, lowest precedence first.
    ///
    /// Fails with [`BrokerError::DuplicateLayer`] if a name repeats.
    pub fn new<I, S>(names: I, base: T) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<LayerName>,
    {
        Self::builder(base).layers(names).build()
    }

    /// Creates a new broker builder over the given base value.
    pub fn builder(base: T) -> LayerBrokerBuilder<T> {
        LayerBrokerBuilder::new(base)
    }

    /// Returns an independent copy of the current effective value.
    pub fn get(&self) -> T {
        self.current.load().deep_copy()
    }

    /// Returns an independent copy of the base value.
    pub fn base(&self) -> T {
        self.calculator.base().deep_copy()
    }

    /// Replaces the overlay of the named layer.
    ///
    /// The overlay is moved into the broker; the caller keeps no handle to it.
    pub fn set_layer(&self, name: &str, overlay: T::Partial) -> Result<()> {
        let mut store = self.store.lock();
        store.set(name, overlay)?;
        self.publish(&store, name, "set");
        Ok(())
    }

    /// Removes the named layer's contribution.
    pub fn clear_layer(&self, name: &str) -> Result<()> {
        let mut store = self.store.lock();
        store.clear(name)?;
        self.publish(&store, name, "clear");
        Ok(())
    }

    /// Edits one layer's overlay under the write lock.
    ///
    /// `edit` works on a copy of the layer's current overlay (or an empty
    /// overlay if the layer has none). However many fields it changes, exactly
    /// one recompute-and-notify cycle follows. If `edit` returns an error the
    /// working copy is discarded, nothing is published and
    /// [`BrokerError::TransactionAborted`] is returned.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// broker.transaction("env", |overlay| {
    ///     overlay.host = Some("db.internal".into());
    ///     overlay.port = Some(5433);
    ///     Ok::<_, std::io::Error>(())
    /// })?;
    /// ```
    pub fn transaction<F, E>(&self, name: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut T::Partial) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        let mut store = self.store.lock();
        let mut working = match store.get(name)? {
            Some(overlay) => T::copy_partial(overlay),
            None => T::Partial::default(),
        };
        if let Err(e) = edit(&mut working) {
            let err = BrokerError::aborted(name, e);
            tracing::debug!("Transaction on layer '{}' aborted: {}", name, err);
            return Err(err);
        }
        store.set(name, working)?;
        self.publish(&store, name, "transaction");
        Ok(())
    }

    /// Decodes an overlay from `source` and places it in the named layer.
    pub fn load_layer<S>(&self, name: &str, source: &S) -> Result<()>
    where
        S: OverlaySource,
        T::Partial: DeserializeOwned,
    {
        if !self.store.lock().contains(name) {
            return Err(BrokerError::unknown_layer(name));
        }
        let overlay = source.overlay::<T::Partial>()?;
        tracing::debug!("Loaded layer '{}' from source '{}'", name, source.name());
        self.set_layer(name, overlay)
    }

    /// Returns a copy of the named layer's overlay, if it has one.
    pub fn layer(&self, name: &str) -> Result<Option<T::Partial>> {
        let store = self.store.lock();
        Ok(store.get(name)?.map(T::copy_partial))
    }

    /// Subscribes to changes of the sub-value at `path`.
    ///
    /// Fails with [`BrokerError::UnknownPath`] if `path` is not in the type's
    /// path set, or [`BrokerError::Closed`] after [`close`](Self::close).
    pub fn subscribe(&self, path: &str) -> Result<Subscription<T>> {
        if self.is_closed() {
            return Err(BrokerError::Closed);
        }
        let path = self
            .paths
            .resolve(path)
            .cloned()
            .ok_or_else(|| BrokerError::unknown_path(path))?;
        let subscription = self.registry.add(path, self.queue_depth);

        // A close that raced with the registration may have missed it.
        if self.is_closed() {
            subscription.unsubscribe();
            return Err(BrokerError::Closed);
        }
        tracing::debug!("Subscribed to '{}'", subscription.path());
        Ok(subscription)
    }

    /// Releases all subscriptions and stops further delivery. Idempotent.
    ///
    /// Reads and mutations keep working afterwards; only subscribing fails.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let released = self.registry.close_all();
        tracing::debug!("Broker closed; released {} subscriptions", released);
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns the layer names in precedence order.
    pub fn layer_names(&self) -> &[LayerName] {
        &self.names
    }

    /// Iterates over the paths that may be subscribed to.
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.paths.iter()
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Recomputes the effective value, publishes it and notifies subscribers.
    ///
    /// Must be called with the write lock held; `store` is the guarded store.
    fn publish(&self, store: &LayerStore<T::Partial>, layer: &str, op: &str) -> NotifyReport {
        let old = self.current.load_full();
        let new = Arc::new(self.calculator.compute(store.snapshot()));
        // Stored before notifying: a subscriber that re-reads on a
        // notification sees at least the value that triggered it.
        self.current.store(Arc::clone(&new));

        let report = self.registry.notify(&self.paths, &old, &new);
        tracing::debug!(
            "Layer '{}' {}: recomputed effective value, {} paths changed, {} notifications",
            layer,
            op,
            report.changed_paths,
            report.delivered
        );
        if report.overflowed > 0 {
            tracing::warn!(
                "{} subscriber queues overflowed after {} on layer '{}'",
                report.overflowed,
                op,
                layer
            );
        }
        report
    }
}

impl<T: Layered + fmt::Debug> fmt::Debug for LayerBroker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerBroker")
            .field("layers", &self.names)
            .field("effective", &*self.current.load())
            .field("paths", &self.paths)
            .field("subscribers", &self.subscriber_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T: Layered> Drop for LayerBroker<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builder for constructing a `LayerBroker`.
///
/// # Examples
///
/// ```rust,ignore
/// let broker = LayerBroker::builder(AppConfig::default())
///     .layer("defaults")
///     .layer("file")
///     .layer("env")
///     .queue_depth(64)
///     .build()?;
/// ```
pub struct LayerBrokerBuilder<T: Layered> {
    base: T,
    layers: Vec<LayerName>,
    queue_depth: usize,
    paths: Option<PathSet<T>>,
}

impl<T: Layered> LayerBrokerBuilder<T> {
    /// Creates a new builder over the given base value.
    pub fn new(base: T) -> Self {
        Self {
            base,
            layers: Vec::new(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            paths: None,
        }
    }

    /// Appends one layer above those already added.
    pub fn layer(mut self, name: impl Into<LayerName>) -> Self {
        self.layers.push(name.into());
        self
    }

    /// Appends several layers, lowest precedence first.
    pub fn layers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<LayerName>,
    {
        self.layers.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets how many pending notifications each subscription keeps.
    ///
    /// Values below one are treated as one.
    pub fn queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Replaces the type's own path table, for example to expose fewer paths.
    pub fn with_paths(mut self, paths: PathSet<T>) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Builds the broker.
    pub fn build(self) -> Result<LayerBroker<T>> {
        let store = LayerStore::new(self.layers)?;
        let names: Vec<LayerName> = store.names().cloned().collect();
        let paths = self.paths.unwrap_or_else(T::paths);
        let current = ArcSwap::from_pointee(self.base.deep_copy());

        tracing::debug!(
            "Built layer broker with layers {:?} and {} subscribable paths",
            names.iter().map(LayerName::as_str).collect::<Vec<_>>(),
            paths.len()
        );

        Ok(LayerBroker {
            store: Mutex::new(store),
            names,
            calculator: EffectiveCalculator::new(self.base),
            current,
            paths,
            registry: SubscriptionRegistry::new(),
            queue_depth: self.queue_depth,
            closed: AtomicBool::new(false),
        })
    }
}
