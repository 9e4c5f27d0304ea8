// SPDX-License-Identifier: MIT OR Apache-2.0

//! Overlay source trait definition.
//!
//! This module defines the `OverlaySource` trait, the port through which
//! external configuration (files, environment variables, ...) becomes a
//! partial overlay that can be placed into a broker layer.

use crate::domain::{BrokerError, Result};
use serde::de::DeserializeOwned;

/// A source of overlay documents.
///
/// A source produces a document tree; [`OverlaySource::overlay`] decodes that
/// tree into a concrete partial type through serde. Partial types are expected
/// to use `Option` fields together with `#[serde(default)]`, so keys missing
/// from the document stay unset.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow for use in multi-threaded contexts.
///
/// # Examples
///
/// ```rust
/// use layerbroker::ports::OverlaySource;
/// use layerbroker::domain::Result;
/// use serde::Deserialize;
///
/// struct FixedSource;
///
/// impl OverlaySource for FixedSource {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn document(&self) -> Result<serde_yaml::Value> {
///         Ok(serde_yaml::from_str("port: 9090").unwrap())
///     }
///
///     fn reload(&mut self) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// #[derive(Debug, Default, Deserialize)]
/// #[serde(default)]
/// struct ServerPartial {
///     host: Option<String>,
///     port: Option<u16>,
/// }
///
/// let overlay: ServerPartial = FixedSource.overlay().unwrap();
/// assert_eq!(overlay.port, Some(9090));
/// assert_eq!(overlay.host, None);
/// ```
pub trait OverlaySource: Send + Sync {
    /// Returns the name of this source, used in logs and errors.
    fn name(&self) -> &str;

    /// Returns the current document tree held by this source.
    fn document(&self) -> Result<serde_yaml::Value>;

    /// Re-reads the underlying data, if the source supports it.
    fn reload(&mut self) -> Result<()>;

    /// Decodes the current document into an overlay of type `P`.
    ///
    /// An empty (null) document decodes to `P::default()`.
    fn overlay<P>(&self) -> Result<P>
    where
        P: DeserializeOwned + Default,
        Self: Sized,
    {
        decode_overlay(self.name(), self.document()?)
    }
}

/// Decodes a document tree into an overlay of type `P`.
pub fn decode_overlay<P>(source_name: &str, document: serde_yaml::Value) -> Result<P>
where
    P: DeserializeOwned + Default,
{
    if document.is_null() {
        return Ok(P::default());
    }
    serde_yaml::from_value(document).map_err(|e| BrokerError::ParseError {
        message: format!("Failed to decode overlay from '{}': {}", source_name, e),
        source: Some(Box::new(e)),
    })
}
