// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Layered` trait: per-type merge, copy and equality operations.
//!
//! A broker never inspects its value type at runtime. Everything it needs to
//! know about a configuration type is supplied through this trait, usually by
//! generated code or a small hand-written implementation.

use crate::ports::PathSet;

/// Operations a configuration type provides so it can be managed by a
/// [`LayerBroker`](crate::service::LayerBroker).
///
/// `Partial` mirrors the shape of `Self` with every field wrapped in `Option`,
/// so that "not set" can be told apart from a zero value. Nested structures
/// are represented by their own partial types.
///
/// # Examples
///
/// ```rust
/// use layerbroker::ports::{Layered, PathSet};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// #[derive(Debug, Clone, Default)]
/// struct ServerPartial {
///     host: Option<String>,
///     port: Option<u16>,
/// }
///
/// impl Layered for Server {
///     type Partial = ServerPartial;
///
///     fn merge(&self, overlay: &ServerPartial) -> Self {
///         Server {
///             host: overlay.host.clone().unwrap_or_else(|| self.host.clone()),
///             port: overlay.port.unwrap_or(self.port),
///         }
///     }
///
///     fn deep_copy(&self) -> Self {
///         self.clone()
///     }
///
///     fn copy_partial(overlay: &ServerPartial) -> ServerPartial {
///         overlay.clone()
///     }
///
///     fn equal(&self, other: &Self) -> bool {
///         self == other
///     }
///
///     fn paths() -> PathSet<Self> {
///         PathSet::new()
///             .field("Host", |s: &Server| &s.host)
///             .field("Port", |s: &Server| &s.port)
///     }
/// }
///
/// let base = Server { host: "localhost".into(), port: 80 };
/// let merged = base.merge(&ServerPartial { port: Some(8080), ..Default::default() });
/// assert_eq!(merged, Server { host: "localhost".into(), port: 8080 });
/// ```
pub trait Layered: Send + Sync + Sized + 'static {
    /// The overlay type: an optional-wrapped mirror of `Self`.
    type Partial: Default + Send + Sync + 'static;

    /// Applies `overlay` on top of `self` and returns the merged value.
    ///
    /// A field set in the overlay replaces the corresponding field; an unset
    /// field leaves it untouched. Nested optional structures recurse under the
    /// same rule.
    fn merge(&self, overlay: &Self::Partial) -> Self;

    /// Returns a fully independent copy with no shared mutable state.
    fn deep_copy(&self) -> Self;

    /// Returns a fully independent copy of an overlay.
    fn copy_partial(overlay: &Self::Partial) -> Self::Partial;

    /// Structural equality, used for change detection.
    fn equal(&self, other: &Self) -> bool;

    /// The fixed set of dotted paths that may be subscribed to.
    fn paths() -> PathSet<Self>;
}
