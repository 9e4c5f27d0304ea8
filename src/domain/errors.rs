// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the layer broker.
//!
//! This module defines the errors that can occur when mutating layers, subscribing
//! to paths or loading overlays from external sources. All errors use `thiserror`
//! for proper error handling and conversion.

use thiserror::Error;

/// A boxed error reported by caller-supplied code or a foreign library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for broker operations.
///
/// Every variant is surfaced synchronously to the caller of the failing
/// operation. A failed mutation leaves the broker in its previous state. It is
/// marked as `#[non_exhaustive]` to allow for future additions without breaking
/// backwards compatibility.
///
/// # Examples
///
/// ```
/// use layerbroker::domain::errors::BrokerError;
///
/// fn lookup_layer(name: &str) -> Result<(), BrokerError> {
///     Err(BrokerError::UnknownLayer {
///         name: name.to_string(),
///     })
/// }
///
/// assert!(lookup_layer("remote").is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BrokerError {
    /// The layer name is not one of the names fixed at construction.
    #[error("Unknown layer: {name}")]
    UnknownLayer {
        /// The name that was requested
        name: String,
    },

    /// The path is not in the type's precomputed path set.
    #[error("Unknown path: {path}")]
    UnknownPath {
        /// The path that was requested
        path: String,
    },

    /// The edit function of a transaction reported a failure.
    ///
    /// Nothing was published and no notification fired.
    #[error("Transaction on layer '{layer}' aborted: {source}")]
    TransactionAborted {
        /// The layer the transaction targeted
        layer: String,
        /// The error reported by the edit function
        source: BoxError,
    },

    /// The same layer name was given twice at construction.
    #[error("Duplicate layer name: {name}")]
    DuplicateLayer {
        /// The repeated name
        name: String,
    },

    /// The broker has been closed and no longer accepts subscriptions.
    #[error("Broker is closed")]
    Closed,

    /// Failed to parse or decode an overlay document.
    #[error("Failed to parse overlay: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<BoxError>,
    },

    /// An error occurred in an overlay source.
    #[error("Overlay source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<BoxError>,
    },

    /// An error occurred in a layer watcher.
    #[error("Layer watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<BoxError>,
    },

    /// An I/O error occurred while reading an overlay.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BrokerError {
    /// Creates an `UnknownLayer` error for the given name.
    pub fn unknown_layer(name: impl Into<String>) -> Self {
        BrokerError::UnknownLayer { name: name.into() }
    }

    /// Creates an `UnknownPath` error for the given path.
    pub fn unknown_path(path: impl Into<String>) -> Self {
        BrokerError::UnknownPath { path: path.into() }
    }

    /// Wraps the error reported by a transaction's edit function.
    pub fn aborted(layer: impl Into<String>, source: impl Into<BoxError>) -> Self {
        BrokerError::TransactionAborted {
            layer: layer.into(),
            source: source.into(),
        }
    }
}

/// A specialized Result type for broker operations.
pub type Result<T> = std::result::Result<T, BrokerError>;
