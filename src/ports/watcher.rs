// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layer watcher trait definition.
//!
//! This module defines the `LayerWatcher` trait, which provides an interface for
//! watching the origin of a layer (usually a file) and triggering a callback
//! when it changes.

use crate::domain::Result;
use std::path::Path;
use std::sync::Arc;

/// Type alias for change notification callbacks.
///
/// The callback receives the location that changed.
pub type ChangeCallback = Arc<dyn Fn(&Path) + Send + Sync>;

/// A trait for watching layer origins for changes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow for use in multi-threaded contexts.
///
/// # Examples
///
/// ```rust
/// use layerbroker::ports::{ChangeCallback, LayerWatcher};
/// use layerbroker::domain::Result;
///
/// struct ManualWatcher {
///     callback: Option<ChangeCallback>,
/// }
///
/// impl LayerWatcher for ManualWatcher {
///     fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
///         self.callback = Some(callback);
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         self.callback = None;
///         Ok(())
///     }
/// }
/// ```
pub trait LayerWatcher: Send + Sync {
    /// Starts watching. The callback should be non-blocking.
    fn watch(&mut self, callback: ChangeCallback) -> Result<()>;

    /// Stops watching. No callbacks fire after this returns.
    fn stop(&mut self) -> Result<()>;
}
