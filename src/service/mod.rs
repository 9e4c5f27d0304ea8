// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the broker and its subscription machinery.
//!
//! `LayerBroker` owns the layer store, publishes the effective value and drives
//! the subscription registry after every mutation.

pub mod broker;
pub mod subscription;

// Re-export commonly used types
pub use broker::{LayerBroker, LayerBrokerBuilder};
pub use subscription::{NotifyReport, Subscription, Unsubscriber, DEFAULT_QUEUE_DEPTH};
