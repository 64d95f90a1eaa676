use alloc::vec::Vec;

use outliner::NodeId;

/// Expansion subscriptions, one per bound cell.
///
/// Binding a cell key to a node replaces whatever that key observed before, so a reused cell
/// only ever hears about the row it currently shows.
#[derive(Clone, Debug)]
pub struct ExpansionObservers<K> {
    bindings: Vec<(K, NodeId)>,
}

impl<K> Default for ExpansionObservers<K> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<K: PartialEq> ExpansionObservers<K> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Subscribes `key` to `node`. Returns the node `key` observed before, if any.
    pub fn bind(&mut self, key: K, node: NodeId) -> Option<NodeId> {
        if let Some(binding) = self.bindings.iter_mut().find(|(k, _)| *k == key) {
            return Some(core::mem::replace(&mut binding.1, node));
        }
        self.bindings.push((key, node));
        None
    }

    pub fn unbind(&mut self, key: &K) -> Option<NodeId> {
        let index = self.bindings.iter().position(|(k, _)| k == key)?;
        Some(self.bindings.swap_remove(index).1)
    }

    pub fn node_for(&self, key: &K) -> Option<NodeId> {
        self.bindings
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, node)| node)
    }

    pub fn subscribers(&self, node: NodeId) -> impl Iterator<Item = &K> + '_ {
        self.bindings
            .iter()
            .filter(move |(_, n)| *n == node)
            .map(|(k, _)| k)
    }

    /// Drops the subscriptions whose node fails `f`.
    pub fn retain(&mut self, mut f: impl FnMut(NodeId) -> bool) {
        self.bindings.retain(|&(_, node)| f(node));
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
