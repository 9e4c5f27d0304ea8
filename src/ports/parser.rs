// SPDX-License-Identifier: MIT OR Apache-2.0

//! Overlay parser trait definition.
//!
//! This module defines the `OverlayParser` trait, which turns the text of an
//! overlay file into a document tree that can later be decoded into a partial
//! type.

use crate::domain::Result;

/// A trait for parsing overlay documents.
///
/// Parsers keep the nested structure of the input: a document such as
///
/// ```yaml
/// database:
///   host: localhost
/// ```
///
/// becomes a mapping holding a `database` mapping, which decodes into a
/// partial type with a nested `database` partial.
///
/// # Examples
///
/// ```rust
/// use layerbroker::ports::OverlayParser;
/// use layerbroker::domain::Result;
///
/// struct NullParser;
///
/// impl OverlayParser for NullParser {
///     fn parse(&self, _content: &str) -> Result<serde_yaml::Value> {
///         Ok(serde_yaml::Value::Null)
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["null"]
///     }
/// }
///
/// let parser = NullParser;
/// assert!(parser.parse("anything").unwrap().is_null());
/// assert!(parser.supports("settings.null"));
/// assert!(!parser.supports("settings.yaml"));
/// ```
pub trait OverlayParser {
    /// Parses raw file content into a document tree.
    fn parse(&self, content: &str) -> Result<serde_yaml::Value>;

    /// Returns the file extensions this parser understands, without the dot.
    fn supported_extensions(&self) -> &[&str];

    /// Returns true if the file name ends in one of the supported extensions.
    fn supports(&self, file_name: &str) -> bool {
        std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.supported_extensions()
                    .iter()
                    .any(|supported| supported.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
