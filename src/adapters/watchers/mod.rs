// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher implementations for overlay change detection.
//!
//! This module contains implementations of the `LayerWatcher` trait for
//! monitoring the origin of a layer.

#[cfg(feature = "reload")]
pub mod file_watcher;

#[cfg(feature = "reload")]
pub use file_watcher::FileWatcher;
