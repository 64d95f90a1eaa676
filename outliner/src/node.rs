use alloc::vec::Vec;

use crate::IndexPath;

/// Identity of a materialized row.
///
/// Ids are handed out by the outline's node arena. A slot is reused after its node is
/// destroyed, but with a new generation, so a stale id never resolves to a different node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// A materialized row: one caller item plus its tree address and expansion state.
#[derive(Clone, Debug)]
pub struct Node<T> {
    pub(crate) item: T,
    pub(crate) path: IndexPath,
    pub(crate) is_expanded: bool,
    pub(crate) parent: Option<NodeId>,
}

impl<T> Node<T> {
    pub(crate) fn new(item: T, path: IndexPath, parent: Option<NodeId>) -> Self {
        Self {
            item,
            path,
            is_expanded: false,
            parent,
        }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn path(&self) -> &IndexPath {
        &self.path
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    /// The owning node, or `None` for root-level rows.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.path.depth()
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Owns every live node. Parent links are ids into this arena, never pointers.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, node: Node<T>) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.node.is_none(), "Arena: free slot is occupied");
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        debug_assert!(index < u32::MAX, "Arena: node capacity exhausted");
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node<T>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(node)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<T>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.len = 0;
    }
}
