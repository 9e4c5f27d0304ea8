// SPDX-License-Identifier: MIT OR Apache-2.0

//! A layered configuration broker.
//!
//! This crate keeps one strongly typed configuration value assembled from a
//! fixed stack of named overlay layers (for example defaults, file, environment
//! and command line). Each layer holds a *partial* value in which every field is
//! optional; the effective value is the base value with every non-empty layer
//! merged on top in precedence order. Subscribers register interest in a field
//! path such as `"Database.Host"` and are told whenever a mutation changes the
//! effective value at that path.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and logic (`FieldPath`, `LayerStore`, `EffectiveCalculator`,
//!   `ChangeDetector`, errors)
//! - **Ports**: Trait definitions that define interfaces (`Layered`, `PathSet`, `OverlaySource`,
//!   `OverlayParser`, `LayerWatcher`)
//! - **Adapters**: Overlay sources for YAML files and environment variables, and a file watcher
//! - **Service**: The `LayerBroker` that orchestrates storage, recomputation and notification
//!
//! # Guarantees
//!
//! - **Precedence**: a set field in a higher layer always wins, independent of call order
//! - **Isolation**: values handed in or out are copies; nothing aliases broker state
//! - **Atomic mutations**: readers see the value before or after a mutation, never a mix
//! - **Change-only notification**: subscribers hear about a path only when its value differs
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML file overlays (default)
//! - `env`: Enable environment variable overlays (default)
//! - `reload`: Enable re-applying a YAML file to a layer when it changes on disk
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use layerbroker::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Database {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Debug, Clone, Default)]
//! struct DatabasePartial {
//!     host: Option<String>,
//!     port: Option<u16>,
//! }
//!
//! impl Layered for Database {
//!     type Partial = DatabasePartial;
//!
//!     fn merge(&self, overlay: &DatabasePartial) -> Self {
//!         Database {
//!             host: overlay.host.clone().unwrap_or_else(|| self.host.clone()),
//!             port: overlay.port.unwrap_or(self.port),
//!         }
//!     }
//!
//!     fn deep_copy(&self) -> Self {
//!         self.clone()
//!     }
//!
//!     fn copy_partial(overlay: &DatabasePartial) -> DatabasePartial {
//!         overlay.clone()
//!     }
//!
//!     fn equal(&self, other: &Self) -> bool {
//!         self == other
//!     }
//!
//!     fn paths() -> PathSet<Self> {
//!         PathSet::new()
//!             .field("Host", |d: &Database| &d.host)
//!             .field("Port", |d: &Database| &d.port)
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let base = Database { host: "localhost".into(), port: 5432 };
//! let broker = LayerBroker::new(["file", "env"], base)?;
//! let host = broker.subscribe("Host")?;
//!
//! broker.set_layer("env", DatabasePartial { host: Some("db.internal".into()), ..Default::default() })?;
//!
//! let change = host.try_recv().expect("host changed");
//! assert_eq!(change.value.host, "db.internal");
//! assert_eq!(broker.get().port, 5432);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
mod fixtures;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{BoxError, BrokerError, Change, FieldPath, LayerName, Result};
    pub use crate::ports::{Layered, OverlayParser, OverlaySource, PathSet};
    pub use crate::service::{LayerBroker, LayerBrokerBuilder, Subscription, Unsubscriber};

    // Re-export adapters based on feature flags
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarAdapter;
    #[cfg(feature = "reload")]
    pub use crate::adapters::FileWatcher;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{YamlFileAdapter, YamlParser};
}
