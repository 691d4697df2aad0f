//! Global layer stacking list
//!
//! This module provides the `LayerStack` data structure holding the ordered list
//! of rendering layers. The first layer in the list is the top-most one; a
//! layer's *previous* neighbour sits directly before it and its *next* neighbour
//! directly after it.

use std::collections::HashMap;

use crate::geometry::LayerId;

/// Ordered list of rendering layers with identity-based membership.
///
/// # Examples
///
/// ```
/// use keypanel::geometry::LayerId;
/// use keypanel::stack::LayerStack;
///
/// let mut stack = LayerStack::new();
/// let a = stack.new_layer();
/// let b = stack.new_layer();
/// stack.push(a);
/// stack.push(b);
///
/// assert_eq!(stack.next_of(a), Some(b));
/// ```
#[derive(Debug, Clone)]
pub struct LayerStack {
    /// Layers in list order, top-most first
    layers: Vec<LayerId>,

    /// Fast lookup: layer ID → position in list
    positions: HashMap<LayerId, usize>,

    /// Next identifier handed out by `new_layer`
    next_id: u32,
}

impl LayerStack {
    /// Creates a new empty layer stack.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            positions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocates a fresh layer identity. The layer is not linked into the list.
    pub fn new_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a layer at the bottom of the list.
    ///
    /// Returns `false` if the layer was already linked.
    pub fn push(&mut self, layer: LayerId) -> bool {
        if self.positions.contains_key(&layer) {
            return false;
        }

        let position = self.layers.len();
        self.layers.push(layer);
        self.positions.insert(layer, position);
        true
    }

    /// Links `layer` directly after `anchor`.
    ///
    /// Returns `false` if `anchor` is not linked, if `layer` is already linked,
    /// or if both are the same layer.
    pub fn insert_after(&mut self, anchor: LayerId, layer: LayerId) -> bool {
        if anchor == layer || self.positions.contains_key(&layer) {
            return false;
        }
        let Some(&pos) = self.positions.get(&anchor) else {
            return false;
        };

        self.layers.insert(pos + 1, layer);
        self.rebuild_positions();
        true
    }

    /// Links `layer` directly before `anchor`.
    ///
    /// Same failure conditions as [`LayerStack::insert_after`].
    pub fn insert_before(&mut self, anchor: LayerId, layer: LayerId) -> bool {
        if anchor == layer || self.positions.contains_key(&layer) {
            return false;
        }
        let Some(&pos) = self.positions.get(&anchor) else {
            return false;
        };

        self.layers.insert(pos, layer);
        self.rebuild_positions();
        true
    }

    /// Makes `next` the direct successor of `previous`, unlinking `next` from
    /// wherever it currently sits.
    ///
    /// Returns `false` if `previous` is not linked or both are the same layer.
    pub fn link(&mut self, previous: LayerId, next: LayerId) -> bool {
        if previous == next || !self.positions.contains_key(&previous) {
            return false;
        }

        self.remove(next);
        self.insert_after(previous, next)
    }

    /// Unlinks a layer.
    ///
    /// Returns `Some(position)` with the layer's previous position if found.
    pub fn remove(&mut self, layer: LayerId) -> Option<usize> {
        let pos = self.positions.remove(&layer)?;
        self.layers.remove(pos);
        self.rebuild_positions();
        Some(pos)
    }

    /// Layer directly after `layer` in list order.
    pub fn next_of(&self, layer: LayerId) -> Option<LayerId> {
        let pos = *self.positions.get(&layer)?;
        self.layers.get(pos + 1).copied()
    }

    /// Layer directly before `layer` in list order.
    pub fn previous_of(&self, layer: LayerId) -> Option<LayerId> {
        let pos = *self.positions.get(&layer)?;
        pos.checked_sub(1).and_then(|p| self.layers.get(p).copied())
    }

    /// Returns the layers in list order, top-most first.
    pub fn order(&self) -> &[LayerId] {
        &self.layers
    }

    /// Returns an iterator over layers in list order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerId> {
        self.layers.iter()
    }

    /// Returns the number of linked layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if no layer is linked.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Checks if a layer is linked.
    pub fn contains(&self, layer: LayerId) -> bool {
        self.positions.contains_key(&layer)
    }

    /// Returns the position of a layer in the list.
    pub fn position(&self, layer: LayerId) -> Option<usize> {
        self.positions.get(&layer).copied()
    }

    /// Rebuilds the position lookup map after positions shift.
    fn rebuild_positions(&mut self) {
        self.positions.clear();
        for (i, &layer) in self.layers.iter().enumerate() {
            self.positions.insert(layer, i);
        }
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}
