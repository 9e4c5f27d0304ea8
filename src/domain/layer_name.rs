// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layer name newtype.

use std::borrow::Borrow;
use std::fmt;

/// The name of a configuration layer, such as `"defaults"`, `"file"` or `"env"`.
///
/// Layer names are fixed when a broker is constructed. Their order in the
/// construction list is their precedence: later names override earlier ones.
///
/// # Examples
///
/// ```
/// use layerbroker::domain::LayerName;
///
/// let name = LayerName::from("env");
/// assert_eq!(name.as_str(), "env");
/// assert_eq!(name, "env");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerName(String);

impl LayerName {
    /// Creates a new `LayerName` from a `String`.
    pub fn new(name: String) -> Self {
        LayerName(name)
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LayerName {
    fn from(s: String) -> Self {
        LayerName(s)
    }
}

impl From<&str> for LayerName {
    fn from(s: &str) -> Self {
        LayerName(s.to_string())
    }
}

impl AsRef<str> for LayerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LayerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LayerName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LayerName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
