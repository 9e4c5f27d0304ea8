// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the interfaces the broker depends on: the per-type
//! operations of a layered configuration type and its path table, plus the
//! traits implemented by overlay sources, parsers and watchers in the adapters
//! layer.

pub mod layered;
pub mod parser;
pub mod paths;
pub mod source;
pub mod watcher;

// Re-export commonly used types
pub use layered::Layered;
pub use parser::OverlayParser;
pub use paths::{PathAccessor, PathSet};
pub use source::{decode_overlay, OverlaySource};
pub use watcher::{ChangeCallback, LayerWatcher};
