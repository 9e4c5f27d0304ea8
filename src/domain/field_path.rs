// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field path newtype for subscribable locations in a configuration value.
//!
//! A `FieldPath` is a dotted identifier such as `Database.Host` naming a field
//! or a whole subtree of a configuration type. The valid paths for a type are
//! enumerated up front by its [`PathSet`](crate::ports::PathSet).

use std::borrow::Borrow;
use std::fmt;

/// A dotted path naming a subscribable field or subtree.
///
/// # Examples
///
/// ```
/// use layerbroker::domain::FieldPath;
///
/// let path = FieldPath::from("Database.Host");
/// assert_eq!(path.as_str(), "Database.Host");
/// assert_eq!(path.segments().collect::<Vec<_>>(), vec!["Database", "Host"]);
/// assert_eq!(path.depth(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(String);

impl FieldPath {
    /// Creates a new `FieldPath` from a `String`.
    pub fn new(path: String) -> Self {
        FieldPath(path)
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the dot separated segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns the number of segments in the path.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns the final segment, the field name itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerbroker::domain::FieldPath;
    ///
    /// assert_eq!(FieldPath::from("Database.Host").field_name(), "Host");
    /// assert_eq!(FieldPath::from("Port").field_name(), "Port");
    /// ```
    pub fn field_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Returns true if `self` names `other` or a subtree containing it.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerbroker::domain::FieldPath;
    ///
    /// let db = FieldPath::from("Database");
    /// assert!(db.contains(&FieldPath::from("Database.Host")));
    /// assert!(!db.contains(&FieldPath::from("DatabaseName")));
    /// ```
    pub fn contains(&self, other: &FieldPath) -> bool {
        match other.0.strip_prefix(self.0.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }

    /// Converts the `FieldPath` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        FieldPath(s)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath(s.to_string())
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.0
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FieldPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_field_path_from_str() {
        let path = FieldPath::from("Database.Host");
        assert_eq!(path.as_str(), "Database.Host");
    }

    #[test]
    fn test_field_path_display() {
        let path = FieldPath::from("Database.Port");
        assert_eq!(format!("{}", path), "Database.Port");
    }

    #[test]
    fn test_field_path_segments() {
        let path = FieldPath::from("a.b.c");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn test_field_path_field_name() {
        assert_eq!(FieldPath::from("a.b.c").field_name(), "c");
        assert_eq!(FieldPath::from("Name").field_name(), "Name");
    }

    #[test]
    fn test_field_path_contains() {
        let root = FieldPath::from("Database");
        assert!(root.contains(&FieldPath::from("Database")));
        assert!(root.contains(&FieldPath::from("Database.Host")));
        assert!(!root.contains(&FieldPath::from("Databases.Host")));
        assert!(!FieldPath::from("Database.Host").contains(&root));
    }

    #[test]
    fn test_field_path_borrow_lookup() {
        let mut map = HashMap::new();
        map.insert(FieldPath::from("Port"), 1);
        assert_eq!(map.get("Port"), Some(&1));
        assert_eq!(map.get("Name"), None);
    }

    #[test]
    fn test_field_path_into_string() {
        let path = FieldPath::from("Name");
        let s: String = path.into();
        assert_eq!(s, "Name");
    }
}
