use alloc::vec::Vec;

use crate::TreeSource;
use crate::node::{Arena, Node, NodeId};

/// An item that was expanded and/or selected before a reload.
pub(crate) struct Remembered<T> {
    pub(crate) item: T,
    pub(crate) expanded: bool,
    pub(crate) selected: bool,
}

/// Decides whether a freshly created node starts expanded.
///
/// The source's expansion intent wins; otherwise `remembered` answers (it is the reload-time
/// expansion memory, or always `false` outside a reload).
pub(crate) fn should_expand<S>(
    source: &S,
    item: &S::Item,
    remembered: &dyn Fn(&S::Item) -> bool,
) -> bool
where
    S: TreeSource + ?Sized,
{
    if let Some(intent) = source.should_auto_expand(item) {
        return intent && source.is_expandable(item);
    }
    remembered(item) && source.is_expandable(item)
}

/// Materializes the children of `parent` in pre-order, recursing into every child that
/// should start expanded, and appends their ids to `out`.
///
/// Only allocates nodes in `arena`; the outline list itself is not touched.
pub(crate) fn flatten_children<S>(
    source: &S,
    arena: &mut Arena<S::Item>,
    parent: NodeId,
    remembered: &dyn Fn(&S::Item) -> bool,
    out: &mut Vec<NodeId>,
) where
    S: TreeSource + ?Sized,
{
    let Some(node) = arena.get(parent) else {
        return;
    };
    let path = node.path.clone();
    let count = source.child_count(Some(&node.item));
    let items: Vec<S::Item> = (0..count)
        .map(|index| source.child(index, Some(&node.item)))
        .collect();

    for (index, item) in items.into_iter().enumerate() {
        let expand = should_expand(source, &item, remembered);
        let mut child = Node::new(item, path.child(index), Some(parent));
        child.is_expanded = expand;
        let id = arena.insert(child);
        out.push(id);
        if expand {
            flatten_children(source, arena, id, remembered, out);
        }
    }
}
