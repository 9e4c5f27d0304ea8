// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path accessor table.
//!
//! A `PathSet<T>` enumerates the dotted paths of `T` that may be subscribed to.
//! Each path carries an accessor that extracts the sub-value at that path and
//! the equality used to decide whether it changed.

use crate::domain::FieldPath;

/// Decides whether the sub-value at one path differs between two values.
///
/// # Examples
///
/// ```rust
/// use layerbroker::ports::PathAccessor;
///
/// struct PortAccessor;
///
/// impl PathAccessor<(String, u16)> for PortAccessor {
///     fn changed(&self, old: &(String, u16), new: &(String, u16)) -> bool {
///         old.1 != new.1
///     }
/// }
///
/// let accessor = PortAccessor;
/// assert!(accessor.changed(&("a".into(), 1), &("a".into(), 2)));
/// assert!(!accessor.changed(&("a".into(), 1), &("b".into(), 1)));
/// ```
pub trait PathAccessor<T>: Send + Sync {
    /// Returns true if the sub-value differs between `old` and `new`.
    ///
    /// A transition between present and absent counts as a change.
    fn changed(&self, old: &T, new: &T) -> bool;
}

enum Getter<T, V> {
    Required(fn(&T) -> &V),
    Optional(fn(&T) -> Option<&V>),
}

struct FieldAccessor<T, V> {
    get: Getter<T, V>,
    eq: fn(&V, &V) -> bool,
}

impl<T, V> FieldAccessor<T, V> {
    fn extract<'a>(&self, value: &'a T) -> Option<&'a V> {
        match self.get {
            Getter::Required(get) => Some(get(value)),
            Getter::Optional(get) => get(value),
        }
    }
}

impl<T, V> PathAccessor<T> for FieldAccessor<T, V> {
    fn changed(&self, old: &T, new: &T) -> bool {
        match (self.extract(old), self.extract(new)) {
            (None, None) => false,
            (Some(a), Some(b)) => !(self.eq)(a, b),
            _ => true,
        }
    }
}

/// The fixed table of subscribable paths for a type.
///
/// Paths are kept in registration order. Registering the same path twice
/// replaces the earlier accessor.
///
/// # Examples
///
/// ```rust
/// use layerbroker::ports::PathSet;
///
/// struct Config {
///     name: String,
///     database: Option<Database>,
/// }
///
/// #[derive(PartialEq)]
/// struct Database {
///     host: String,
/// }
///
/// let paths: PathSet<Config> = PathSet::new()
///     .field("Name", |c: &Config| &c.name)
///     .optional("Database", |c: &Config| c.database.as_ref())
///     .optional("Database.Host", |c: &Config| c.database.as_ref().map(|d| &d.host));
///
/// assert_eq!(paths.len(), 3);
/// assert!(paths.contains("Database.Host"));
///
/// let without = Config { name: "a".into(), database: None };
/// let with = Config {
///     name: "a".into(),
///     database: Some(Database { host: "db".into() }),
/// };
/// let accessor = paths.get("Database").unwrap();
/// assert!(accessor.changed(&without, &with));
/// assert!(!paths.get("Name").unwrap().changed(&without, &with));
/// ```
pub struct PathSet<T> {
    entries: Vec<(FieldPath, Box<dyn PathAccessor<T>>)>,
}

impl<T: 'static> PathSet<T> {
    /// Creates an empty path set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers an always-present field compared with `PartialEq`.
    pub fn field<V: PartialEq + 'static>(self, path: &str, get: fn(&T) -> &V) -> Self {
        self.field_with(path, get, <V as PartialEq>::eq)
    }

    /// Registers an always-present field compared with a custom equality.
    pub fn field_with<V: 'static>(
        self,
        path: &str,
        get: fn(&T) -> &V,
        eq: fn(&V, &V) -> bool,
    ) -> Self {
        self.with_accessor(
            path,
            FieldAccessor {
                get: Getter::Required(get),
                eq,
            },
        )
    }

    /// Registers an optional field or subtree compared with `PartialEq`.
    ///
    /// The accessor returns `None` when the field, or any parent on its path,
    /// is absent.
    pub fn optional<V: PartialEq + 'static>(self, path: &str, get: fn(&T) -> Option<&V>) -> Self {
        self.optional_with(path, get, <V as PartialEq>::eq)
    }

    /// Registers an optional field or subtree compared with a custom equality.
    pub fn optional_with<V: 'static>(
        self,
        path: &str,
        get: fn(&T) -> Option<&V>,
        eq: fn(&V, &V) -> bool,
    ) -> Self {
        self.with_accessor(
            path,
            FieldAccessor {
                get: Getter::Optional(get),
                eq,
            },
        )
    }

    /// Registers a path with a hand-written accessor.
    pub fn with_accessor(mut self, path: &str, accessor: impl PathAccessor<T> + 'static) -> Self {
        let accessor: Box<dyn PathAccessor<T>> = Box::new(accessor);
        match self.entries.iter_mut().find(|(p, _)| p.as_str() == path) {
            Some(entry) => entry.1 = accessor,
            None => self.entries.push((FieldPath::from(path), accessor)),
        }
        self
    }
}

impl<T> PathSet<T> {
    /// Returns true if `path` is a registered path.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Returns the accessor registered for `path`.
    pub fn get(&self, path: &str) -> Option<&dyn PathAccessor<T>> {
        self.entries
            .iter()
            .find(|(p, _)| p.as_str() == path)
            .map(|(_, accessor)| accessor.as_ref())
    }

    /// Looks up the canonical `FieldPath` for `path`.
    pub fn resolve(&self, path: &str) -> Option<&FieldPath> {
        self.entries
            .iter()
            .map(|(p, _)| p)
            .find(|p| p.as_str() == path)
    }

    /// Iterates over the registered paths in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldPath> {
        self.entries.iter().map(|(p, _)| p)
    }

    /// Returns the number of registered paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no paths are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: 'static> Default for PathSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for PathSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ServerConfig, TlsConfig};

    fn server(port: u16, tls: Option<TlsConfig>) -> ServerConfig {
        ServerConfig {
            name: "api".to_string(),
            port,
            tls,
        }
    }

    #[test]
    fn test_required_field_change() {
        let paths = PathSet::new().field("Port", |s: &ServerConfig| &s.port);
        let accessor = paths.get("Port").unwrap();

        assert!(accessor.changed(&server(80, None), &server(81, None)));
        assert!(!accessor.changed(&server(80, None), &server(80, None)));
    }

    #[test]
    fn test_optional_presence_transition() {
        let paths =
            PathSet::new().optional("Tls", |s: &ServerConfig| s.tls.as_ref());
        let accessor = paths.get("Tls").unwrap();
        let tls = TlsConfig {
            cert: "a.pem".to_string(),
            verify: true,
        };

        assert!(accessor.changed(&server(80, None), &server(80, Some(tls.clone()))));
        assert!(accessor.changed(&server(80, Some(tls.clone())), &server(80, None)));
        assert!(!accessor.changed(&server(80, None), &server(80, None)));
        assert!(!accessor.changed(&server(80, Some(tls.clone())), &server(80, Some(tls))));
    }

    #[test]
    fn test_custom_equality() {
        // Names compare case-insensitively.
        let paths = PathSet::new().field_with(
            "Name",
            |s: &ServerConfig| &s.name,
            |a: &String, b: &String| a.eq_ignore_ascii_case(b),
        );
        let mut upper = server(80, None);
        upper.name = "API".to_string();

        assert!(!paths.get("Name").unwrap().changed(&server(80, None), &upper));
    }

    #[test]
    fn test_registration_order_and_replace() {
        let paths = PathSet::new()
            .field("Port", |s: &ServerConfig| &s.port)
            .field("Name", |s: &ServerConfig| &s.name)
            .field_with("Port", |s: &ServerConfig| &s.port, |_, _| true);

        let names: Vec<_> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["Port", "Name"]);
        assert!(!paths.get("Port").unwrap().changed(&server(1, None), &server(2, None)));
    }

    #[test]
    fn test_unknown_path() {
        let paths = PathSet::new().field("Port", |s: &ServerConfig| &s.port);
        assert!(!paths.contains("Host"));
        assert!(paths.get("Host").is_none());
        assert!(paths.resolve("Host").is_none());
    }

    #[test]
    fn test_empty_path_set() {
        let paths: PathSet<ServerConfig> = PathSet::default();
        assert!(paths.is_empty());
        assert_eq!(paths.len(), 0);
    }
}
