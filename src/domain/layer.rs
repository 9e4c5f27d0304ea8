// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named, precedence-ordered overlay slots.
//!
//! The `LayerStore` holds one slot per layer name fixed at construction. A slot
//! is either empty ("no contribution") or holds a partial overlay value.

use crate::domain::{BrokerError, LayerName, Result};

/// A single named overlay slot.
#[derive(Debug, Clone)]
pub struct Layer<P> {
    name: LayerName,
    position: usize,
    overlay: Option<P>,
}

impl<P> Layer<P> {
    /// The layer's name.
    pub fn name(&self) -> &LayerName {
        &self.name
    }

    /// The layer's precedence index. Higher positions override lower ones.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The overlay currently held by this layer, if any.
    pub fn overlay(&self) -> Option<&P> {
        self.overlay.as_ref()
    }

    /// Returns true if the layer currently contributes nothing.
    pub fn is_empty(&self) -> bool {
        self.overlay.is_none()
    }
}

/// Ordered table of named overlays.
///
/// The store itself is not synchronized; the broker only touches it while
/// holding its write lock, which is what makes [`LayerStore::snapshot`]
/// consistent.
///
/// # Examples
///
/// ```
/// use layerbroker::domain::LayerStore;
///
/// # fn main() -> layerbroker::domain::Result<()> {
/// let mut store: LayerStore<&str> = LayerStore::new(["file", "env"])?;
/// store.set("env", "from-env")?;
/// store.set("file", "from-file")?;
///
/// let overlays: Vec<_> = store.snapshot().collect();
/// assert_eq!(overlays, vec![&"from-file", &"from-env"]);
///
/// store.clear("file")?;
/// assert_eq!(store.snapshot().count(), 1);
/// assert!(store.set("cli", "x").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LayerStore<P> {
    layers: Vec<Layer<P>>,
}

impl<P> LayerStore<P> {
    /// Creates a store with one empty slot per name, in precedence order.
    ///
    /// Fails with [`BrokerError::DuplicateLayer`] if a name repeats.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<LayerName>,
    {
        let mut layers: Vec<Layer<P>> = Vec::new();
        for name in names {
            let name = name.into();
            if layers.iter().any(|l| l.name == name) {
                return Err(BrokerError::DuplicateLayer {
                    name: name.as_str().to_string(),
                });
            }
            let position = layers.len();
            layers.push(Layer {
                name,
                position,
                overlay: None,
            });
        }
        Ok(Self { layers })
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Layer<P>> {
        self.layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| BrokerError::unknown_layer(name))
    }

    fn slot(&self, name: &str) -> Result<&Layer<P>> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| BrokerError::unknown_layer(name))
    }

    /// Replaces the content of the named slot, returning the previous overlay.
    pub fn set(&mut self, name: &str, overlay: P) -> Result<Option<P>> {
        Ok(self.slot_mut(name)?.overlay.replace(overlay))
    }

    /// Empties the named slot, returning the previous overlay.
    pub fn clear(&mut self, name: &str) -> Result<Option<P>> {
        Ok(self.slot_mut(name)?.overlay.take())
    }

    /// Borrows the overlay held by the named slot.
    pub fn get(&self, name: &str) -> Result<Option<&P>> {
        Ok(self.slot(name)?.overlay())
    }

    /// Returns the precedence index of the named slot.
    pub fn position(&self, name: &str) -> Result<usize> {
        Ok(self.slot(name)?.position)
    }

    /// Returns true if `name` is one of the names fixed at construction.
    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_ok()
    }

    /// Iterates over the non-empty overlays in ascending precedence order.
    pub fn snapshot(&self) -> impl Iterator<Item = &P> {
        self.layers.iter().filter_map(|l| l.overlay.as_ref())
    }

    /// Iterates over all layers in precedence order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer<P>> {
        self.layers.iter()
    }

    /// Iterates over the layer names in precedence order.
    pub fn names(&self) -> impl Iterator<Item = &LayerName> {
        self.layers.iter().map(|l| &l.name)
    }

    /// Returns the number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the store has no layers at all.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LayerStore<u32> {
        LayerStore::new(["defaults", "file", "env", "cli"]).unwrap()
    }

    #[test]
    fn test_new_assigns_positions() {
        let store = store();
        let positions: Vec<_> = store
            .layers()
            .map(|l| (l.name().as_str(), l.position()))
            .collect();
        assert_eq!(
            positions,
            vec![("defaults", 0), ("file", 1), ("env", 2), ("cli", 3)]
        );
        assert!(store.layers().all(|l| l.is_empty()));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = LayerStore::<u32>::new(["file", "env", "file"]);
        assert!(matches!(
            result,
            Err(BrokerError::DuplicateLayer { ref name }) if name == "file"
        ));
    }

    #[test]
    fn test_empty_store() {
        let store = LayerStore::<u32>::new(Vec::<String>::new()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.snapshot().count(), 0);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut store = store();
        assert_eq!(store.set("env", 1).unwrap(), None);
        assert_eq!(store.set("env", 2).unwrap(), Some(1));
        assert_eq!(store.get("env").unwrap(), Some(&2));
    }

    #[test]
    fn test_set_unknown_layer() {
        let mut store = store();
        let err = store.set("remote", 1).unwrap_err();
        assert!(matches!(err, BrokerError::UnknownLayer { ref name } if name == "remote"));
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.set("file", 7).unwrap();
        assert_eq!(store.clear("file").unwrap(), Some(7));
        assert_eq!(store.clear("file").unwrap(), None);
        assert!(store.clear("remote").is_err());
    }

    #[test]
    fn test_snapshot_is_in_precedence_order() {
        let mut store = store();
        store.set("cli", 4).unwrap();
        store.set("defaults", 1).unwrap();
        store.set("env", 3).unwrap();

        let overlays: Vec<u32> = store.snapshot().copied().collect();
        assert_eq!(overlays, vec![1, 3, 4]);
    }

    #[test]
    fn test_position_and_contains() {
        let store = store();
        assert_eq!(store.position("env").unwrap(), 2);
        assert!(store.contains("cli"));
        assert!(!store.contains("remote"));
        assert!(store.position("remote").is_err());
    }

    #[test]
    fn test_names() {
        let store = store();
        let names: Vec<_> = store.names().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["defaults", "file", "env", "cli"]);
    }
}
