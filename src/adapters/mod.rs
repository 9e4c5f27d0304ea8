// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing overlay source implementations.
//!
//! This module contains concrete implementations of the traits defined in the
//! ports layer: overlay sources that read YAML files or environment variables,
//! and a file watcher that keeps a layer in sync with a file on disk.

#[cfg(feature = "env")]
pub mod env_var;
#[cfg(feature = "yaml")]
pub mod yaml_file;

pub mod watchers;

// Re-export adapters based on feature flags
#[cfg(feature = "env")]
pub use env_var::EnvVarAdapter;
#[cfg(feature = "reload")]
pub use watchers::FileWatcher;
#[cfg(feature = "yaml")]
pub use yaml_file::{YamlFileAdapter, YamlParser};
