use alloc::vec::Vec;

/// A tree address: the child index at every level from the (virtual) root.
///
/// Root-level nodes have paths of length 1. The empty path names the virtual root, which is
/// never materialized as a row.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexPath(Vec<usize>);

impl IndexPath {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indentation depth of the row at this path (`len - 1`, root-level rows are depth 0).
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// The local sibling index.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// The parent's path. For root-level paths this is the empty (virtual root) path.
    pub fn parent(&self) -> Option<IndexPath> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    pub fn child(&self, index: usize) -> IndexPath {
        let mut v = Vec::with_capacity(self.0.len() + 1);
        v.extend_from_slice(&self.0);
        v.push(index);
        Self(v)
    }

    pub fn is_prefix_of(&self, other: &IndexPath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// `true` when `other` lies strictly inside the subtree addressed by `self`.
    pub fn is_strict_prefix_of(&self, other: &IndexPath) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }

    pub(crate) fn set(&mut self, depth: usize, index: usize) {
        self.0[depth] = index;
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(v: Vec<usize>) -> Self {
        Self(v)
    }
}

impl From<&[usize]> for IndexPath {
    fn from(v: &[usize]) -> Self {
        Self(v.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for IndexPath {
    fn from(v: [usize; N]) -> Self {
        Self(v.to_vec())
    }
}

/// How an item behaves when its row is reloaded in place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemIdentity {
    /// The item is a handle whose contents change behind it; the stored value is kept.
    #[default]
    Stable,
    /// The item is a value snapshot; reloading re-queries it from the source.
    Refetch,
}

/// A batch of positional instructions for the host list.
///
/// All indexes are in the coordinates of the *active* sequence (filtered if a filter is
/// active, otherwise the outline list). `deleted` and `reloaded` use pre-change coordinates,
/// `inserted` post-change coordinates, matching the usual batch-update contract of list
/// widgets: apply deletes first, then inserts. All three lists are sorted ascending without
/// duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowChanges {
    pub deleted: Vec<usize>,
    pub inserted: Vec<usize>,
    pub reloaded: Vec<usize>,
    /// The projection was rebuilt from scratch; the host should reload everything and ignore
    /// the index lists.
    pub full_reload: bool,
}

impl RowChanges {
    pub fn full() -> Self {
        Self {
            full_reload: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.full_reload
            && self.deleted.is_empty()
            && self.inserted.is_empty()
            && self.reloaded.is_empty()
    }

    /// `true` when more than one kind of instruction is present. The host should then apply
    /// them in a single update pass so reload indexes keep their pre-change meaning.
    pub fn needs_grouping(&self) -> bool {
        let kinds = [&self.deleted, &self.inserted, &self.reloaded]
            .iter()
            .filter(|list| !list.is_empty())
            .count();
        !self.full_reload && kinds > 1
    }
}
