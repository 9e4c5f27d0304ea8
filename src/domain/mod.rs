// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core business logic and types.
//!
//! This module contains the building blocks of the broker: layer slots, the
//! effective value fold, change detection and the error type. None of it is
//! synchronized on its own; the service layer wraps it in locks.

pub mod change;
pub mod effective;
pub mod errors;
pub mod field_path;
pub mod layer;
pub mod layer_name;

// Re-export commonly used types
pub use change::{Change, ChangeDetector};
pub use effective::EffectiveCalculator;
pub use errors::{BoxError, BrokerError, Result};
pub use field_path::FieldPath;
pub use layer::{Layer, LayerStore};
pub use layer_name::LayerName;
