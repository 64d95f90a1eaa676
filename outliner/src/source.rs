use crate::ItemIdentity;

/// The caller's tree, as seen by the projection.
///
/// `None` as a parent means "the top level". The outline never inspects items beyond passing
/// them back to these methods (and comparing them with `PartialEq` where a method says so).
///
/// Implementations must be free of side effects: the engine queries them repeatedly and in
/// any order while flattening. `child(index, parent)` must return the same item for the same
/// arguments until the host reloads.
pub trait TreeSource {
    type Item;

    fn child_count(&self, parent: Option<&Self::Item>) -> usize;

    fn child(&self, index: usize, parent: Option<&Self::Item>) -> Self::Item;

    fn is_expandable(&self, item: &Self::Item) -> bool;

    /// Expansion intent for a freshly materialized item.
    ///
    /// `None` (the default) defers to the outline's expansion memory, which is only consulted
    /// during a reload with `maintain_expanded` enabled.
    fn should_auto_expand(&self, _item: &Self::Item) -> Option<bool> {
        None
    }

    /// Whether reloading a row re-queries its item (see [`crate::Outline::reload_items`]).
    fn item_identity(&self) -> ItemIdentity {
        ItemIdentity::Stable
    }
}

impl<S: TreeSource + ?Sized> TreeSource for &S {
    type Item = S::Item;

    fn child_count(&self, parent: Option<&Self::Item>) -> usize {
        (**self).child_count(parent)
    }

    fn child(&self, index: usize, parent: Option<&Self::Item>) -> Self::Item {
        (**self).child(index, parent)
    }

    fn is_expandable(&self, item: &Self::Item) -> bool {
        (**self).is_expandable(item)
    }

    fn should_auto_expand(&self, item: &Self::Item) -> Option<bool> {
        (**self).should_auto_expand(item)
    }

    fn item_identity(&self) -> ItemIdentity {
        (**self).item_identity()
    }
}
