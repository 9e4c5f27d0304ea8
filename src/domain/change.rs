// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notifications and change detection.

use crate::domain::FieldPath;
use crate::ports::PathSet;

/// A notification that the sub-value at `path` changed.
///
/// `value` is an independent copy of the full effective value published by the
/// mutation that triggered the notification. Notifications are hints: a
/// subscriber that falls behind may miss intermediate values, so anything that
/// needs the latest state should re-read it from the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    /// The subscribed path whose sub-value changed.
    pub path: FieldPath,
    /// The new effective value.
    pub value: T,
}

/// Compares an old and a new effective value at a set of paths.
///
/// # Examples
///
/// ```rust
/// use layerbroker::domain::{ChangeDetector, FieldPath};
/// use layerbroker::ports::PathSet;
///
/// let paths: PathSet<(String, u16)> = PathSet::new()
///     .field("Name", |v: &(String, u16)| &v.0)
///     .field("Port", |v: &(String, u16)| &v.1);
/// let detector = ChangeDetector::new(&paths);
///
/// let subscribed = [FieldPath::from("Name"), FieldPath::from("Port")];
/// let changed = detector.changed_paths(
///     subscribed.iter(),
///     &("api".to_string(), 80),
///     &("api".to_string(), 8080),
/// );
/// assert_eq!(changed, vec![&FieldPath::from("Port")]);
/// ```
pub struct ChangeDetector<'a, T> {
    paths: &'a PathSet<T>,
}

impl<'a, T> ChangeDetector<'a, T> {
    /// Creates a detector over the given path table.
    pub fn new(paths: &'a PathSet<T>) -> Self {
        Self { paths }
    }

    /// Returns true if the sub-value at `path` differs between `old` and `new`.
    ///
    /// Paths that are not in the table never report a change.
    pub fn changed(&self, path: &str, old: &T, new: &T) -> bool {
        self.paths
            .get(path)
            .map(|accessor| accessor.changed(old, new))
            .unwrap_or(false)
    }

    /// Filters `subscribed` down to the paths whose sub-value changed.
    ///
    /// Each distinct path is reported at most once, in first-seen order.
    pub fn changed_paths<'p, I>(&self, subscribed: I, old: &T, new: &T) -> Vec<&'p FieldPath>
    where
        I: IntoIterator<Item = &'p FieldPath>,
    {
        let mut changed: Vec<&'p FieldPath> = Vec::new();
        for path in subscribed {
            if changed.contains(&path) {
                continue;
            }
            if self.changed(path.as_str(), old, new) {
                changed.push(path);
            }
        }
        changed
    }
}
