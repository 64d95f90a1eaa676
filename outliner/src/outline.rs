use alloc::vec::Vec;
use core::ops::Range;

use crate::batch::IndexBatch;
use crate::filter::FilterState;
use crate::flatten::{Remembered, flatten_children, should_expand};
use crate::key::NodeSet;
use crate::node::{Arena, Node, NodeId};
use crate::{IndexPath, ItemIdentity, OutlineError, OutlineOptions, RowChanges, TreeSource};

/// A headless outline projection.
///
/// Keeps a flat, pre-order list of the visible nodes of a caller-supplied tree in sync with
/// expansion state, structural edits and an optional filter:
/// - It does not hold any UI objects or the tree itself. Every operation that needs to query
///   the tree borrows a [`TreeSource`].
/// - Every structural operation returns the [`RowChanges`] the host list must replay, in the
///   coordinates of the active (filtered or unfiltered) sequence.
///
/// The outline assumes exclusive, single-threaded access. Each operation runs to completion;
/// the host never observes a partially updated list.
#[derive(Clone)]
pub struct Outline<T> {
    options: OutlineOptions<T>,
    pub(crate) arena: Arena<T>,
    pub(crate) rows: Vec<NodeId>,
    pub(crate) selection: NodeSet,
    pub(crate) filter: Option<FilterState<T>>,
}

impl<T> Default for Outline<T> {
    fn default() -> Self {
        Self::new(OutlineOptions::new())
    }
}

impl<T> Outline<T> {
    /// Creates an empty outline. Call [`Self::populate_roots`] or [`Self::reload`] to fill it.
    pub fn new(options: OutlineOptions<T>) -> Self {
        odebug!(
            maintain_expanded = options.maintain_expanded,
            "Outline::new"
        );
        Self {
            options,
            arena: Arena::new(),
            rows: Vec::new(),
            selection: NodeSet::default(),
            filter: None,
        }
    }

    pub fn options(&self) -> &OutlineOptions<T> {
        &self.options
    }

    pub fn set_options(&mut self, options: OutlineOptions<T>) {
        self.options = options;
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut OutlineOptions<T>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    // Queries. Unprefixed lookups address the active sequence; `outline_*` lookups address
    // the unfiltered outline list.

    pub(crate) fn active(&self) -> &[NodeId] {
        match &self.filter {
            Some(filter) => &filter.rows,
            None => &self.rows,
        }
    }

    /// Number of rows the host list should display.
    pub fn row_count(&self) -> usize {
        self.active().len()
    }

    pub fn rows(&self) -> &[NodeId] {
        self.active()
    }

    pub fn outline_len(&self) -> usize {
        self.rows.len()
    }

    pub fn outline_rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.arena.get(id)
    }

    /// `true` while `id` names a node in the outline list.
    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some()
    }

    pub fn id_at(&self, position: usize) -> Option<NodeId> {
        self.active().get(position).copied()
    }

    pub fn node_at(&self, position: usize) -> Option<&Node<T>> {
        self.id_at(position).and_then(|id| self.arena.get(id))
    }

    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.active().iter().position(|&row| row == id)
    }

    pub fn outline_position_of(&self, id: NodeId) -> Option<usize> {
        self.rows.iter().position(|&row| row == id)
    }

    /// Finds the node currently addressed by `path`.
    pub fn node_for_path(&self, path: &IndexPath) -> Option<NodeId> {
        self.rows
            .iter()
            .copied()
            .find(|&id| self.arena.get(id).is_some_and(|node| node.path == *path))
    }

    pub fn position_for_path(&self, path: &IndexPath) -> Option<usize> {
        self.active()
            .iter()
            .position(|&id| self.arena.get(id).is_some_and(|node| node.path == *path))
    }

    pub fn outline_position_for_path(&self, path: &IndexPath) -> Option<usize> {
        self.rows
            .iter()
            .position(|&id| self.arena.get(id).is_some_and(|node| node.path == *path))
    }

    pub fn path_for_position(&self, position: usize) -> Option<&IndexPath> {
        self.node_at(position).map(|node| &node.path)
    }

    /// First active node whose item satisfies `f`.
    pub fn find(&self, mut f: impl FnMut(&T) -> bool) -> Option<NodeId> {
        self.active()
            .iter()
            .copied()
            .find(|&id| self.arena.get(id).is_some_and(|node| f(&node.item)))
    }

    /// Active position of the first node whose item equals `item`.
    pub fn position_of_item(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.active()
            .iter()
            .position(|&id| self.arena.get(id).is_some_and(|node| node.item == *item))
    }

    /// Iterates over the active sequence in display order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<T>)> + '_ {
        self.active()
            .iter()
            .filter_map(|&id| self.arena.get(id).map(|node| (id, node)))
    }

    pub(crate) fn outline_node(&self, position: usize) -> Option<&Node<T>> {
        self.rows.get(position).and_then(|&id| self.arena.get(id))
    }

    /// The contiguous run of rows after `position` that lie inside its subtree.
    pub(crate) fn descendant_range(&self, position: usize) -> Range<usize> {
        let start = position + 1;
        let Some(node) = self.outline_node(position) else {
            return start..start;
        };
        let mut end = start;
        while let Some(next) = self.outline_node(end) {
            if !node.path.is_strict_prefix_of(&next.path) {
                break;
            }
            end += 1;
        }
        start..end
    }

    /// Every outline position whose path lies strictly under `path`, wherever it sits.
    fn descendant_positions(&self, path: &IndexPath) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|&(_, &id)| {
                self.arena
                    .get(id)
                    .is_some_and(|node| path.is_strict_prefix_of(&node.path))
            })
            .map(|(position, _)| position)
            .collect()
    }

    // Selection.

    /// Marks `id` as selected. Returns `false` if the node is not in the outline.
    pub fn select(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            owarn!("Outline::select: node is not in the outline");
            return false;
        }
        self.selection.insert(id);
        true
    }

    pub fn deselect(&mut self, id: NodeId) -> bool {
        self.selection.remove(&id)
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected nodes, in no particular order.
    pub fn selected(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selection.iter().copied()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // Structural operations.

    fn clear_nodes(&mut self) {
        self.rows.clear();
        self.arena.clear();
        self.selection.clear();
        if let Some(filter) = &mut self.filter {
            filter.rows.clear();
            filter.protected.clear();
        }
    }

    fn fill_roots<S>(&mut self, source: &S)
    where
        S: TreeSource<Item = T> + ?Sized,
    {
        let count = source.child_count(None);
        self.rows.reserve(count);
        for index in 0..count {
            let item = source.child(index, None);
            let id = self
                .arena
                .insert(Node::new(item, IndexPath::from([index]), None));
            self.rows.push(id);
        }
    }

    /// Discards every node and rebuilds the outline from the source's top level, all
    /// collapsed.
    pub fn populate_roots<S>(&mut self, source: &S) -> RowChanges
    where
        S: TreeSource<Item = T> + ?Sized,
    {
        self.clear_nodes();
        self.fill_roots(source);
        odebug!(roots = self.rows.len(), "Outline::populate_roots");
        self.project_full()
    }

    /// User-initiated expand or collapse, depending on the node's current state.
    pub fn toggle<S>(&mut self, source: &S, id: NodeId) -> Result<RowChanges, OutlineError>
    where
        S: TreeSource<Item = T> + ?Sized,
    {
        let Some(node) = self.arena.get(id) else {
            owarn!("Outline::toggle: node is not in the outline");
            return Err(OutlineError::NodeNotFound);
        };
        if node.is_expanded {
            self.collapse(id, true)
        } else {
            self.expand(source, id, true)
        }
    }

    /// Expands `id`, splicing its flattened children (and any descendants that should start
    /// expanded) directly after it.
    ///
    /// Expanding an already expanded node is a no-op.
    pub fn expand<S>(
        &mut self,
        source: &S,
        id: NodeId,
        user_initiated: bool,
    ) -> Result<RowChanges, OutlineError>
    where
        S: TreeSource<Item = T> + ?Sized,
    {
        let changes = self.expand_in_outline(source, id, user_initiated, &|_| false)?;
        Ok(self.project(changes, &[]))
    }

    fn expand_in_outline<S>(
        &mut self,
        source: &S,
        id: NodeId,
        user_initiated: bool,
        remembered: &dyn Fn(&T) -> bool,
    ) -> Result<RowChanges, OutlineError>
    where
        S: TreeSource<Item = T> + ?Sized,
    {
        let Some(position) = self.outline_position_of(id) else {
            owarn!("Outline::expand: node is not in the outline");
            return Err(OutlineError::NodeNotFound);
        };
        let Some(node) = self.arena.get(id) else {
            return Err(OutlineError::NodeNotFound);
        };
        if !source.is_expandable(&node.item) {
            owarn!(position, "Outline::expand: item is not expandable");
            return Err(OutlineError::NotExpandable);
        }
        if node.is_expanded {
            otrace!(position, "Outline::expand: already expanded");
            return Ok(RowChanges::default());
        }
        if user_initiated {
            if let Some(hook) = &self.options.on_will_expand {
                hook(&node.item);
            }
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.is_expanded = true;
        }
        let mut spliced = Vec::new();
        flatten_children(source, &mut self.arena, id, remembered, &mut spliced);
        let start = position + 1;
        let count = spliced.len();
        self.rows.splice(start..start, spliced);

        if user_initiated {
            if let (Some(hook), Some(node)) = (&self.options.on_did_expand, self.arena.get(id)) {
                hook(&node.item);
            }
        }
        odebug!(position, inserted = count, user_initiated, "Outline::expand");

        let mut inserted = IndexBatch::new(self.rows.len());
        inserted.push_range(start, start + count);
        Ok(RowChanges {
            inserted: inserted.finish(),
            ..RowChanges::default()
        })
    }

    /// Collapses `id`, removing every descendant row in one batch.
    pub fn collapse(&mut self, id: NodeId, user_initiated: bool) -> Result<RowChanges, OutlineError> {
        let Some(node) = self.arena.get(id) else {
            owarn!("Outline::collapse: node is not in the outline");
            return Err(OutlineError::NodeNotFound);
        };
        if !node.is_expanded {
            owarn!(depth = node.depth(), "Outline::collapse: node is not expanded");
            return Err(OutlineError::NotCollapsible);
        }
        if user_initiated {
            if let Some(hook) = &self.options.on_will_collapse {
                hook(&node.item);
            }
        }

        let doomed = self.descendant_positions(&node.path);
        if let Some(node) = self.arena.get_mut(id) {
            node.is_expanded = false;
        }
        let deleted = self.remove_positions(&doomed);

        if user_initiated {
            if let (Some(hook), Some(node)) = (&self.options.on_did_collapse, self.arena.get(id)) {
                hook(&node.item);
            }
        }
        odebug!(deleted = deleted.len(), user_initiated, "Outline::collapse");

        Ok(self.project(
            RowChanges {
                deleted,
                ..RowChanges::default()
            },
            &[],
        ))
    }

    /// Removes the rows at `positions` (outline coordinates) and destroys their nodes.
    ///
    /// Returns the removed positions, sorted and deduplicated.
    fn remove_positions(&mut self, positions: &[usize]) -> Vec<usize> {
        let mut batch = IndexBatch::new(self.rows.len());
        for &position in positions {
            batch.push(position);
        }
        let removed = batch.finish();
        if removed.is_empty() {
            return removed;
        }

        let mut doomed = removed.iter().copied().peekable();
        let mut kept = Vec::with_capacity(self.rows.len() - removed.len());
        for (position, id) in self.rows.drain(..).enumerate() {
            if doomed.peek() == Some(&position) {
                doomed.next();
                self.arena.remove(id);
                self.selection.remove(&id);
                if let Some(filter) = &mut self.filter {
                    filter.protected.remove(&id);
                }
            } else {
                kept.push(id);
            }
        }
        self.rows = kept;
        removed
    }

    /// Materializes newly added tree items at `paths`.
    ///
    /// A path is inserted only if it is not already present, its parent is present and
    /// expanded (root-level paths always qualify), and its local index is below the parent's
    /// current child count. Other paths are skipped. New nodes start collapsed.
    ///
    /// Existing paths are never renumbered. To insert between present siblings, the caller
    /// has to report the shifted siblings too (delete and re-insert them, or `reload`);
    /// otherwise the occupied path is skipped and a later insert at the old tail index
    /// materializes an item that is already present under a stale path.
    pub fn insert<S>(&mut self, source: &S, paths: &[IndexPath]) -> RowChanges
    where
        S: TreeSource<Item = T> + ?Sized,
    {
        let mut targets: Vec<&IndexPath> = paths.iter().filter(|path| !path.is_empty()).collect();
        targets.sort();
        targets.dedup();

        let mut added = NodeSet::default();
        for path in targets {
            if self.node_for_path(path).is_some() {
                otrace!("Outline::insert: path already present");
                continue;
            }
            let Some(local) = path.last() else {
                continue;
            };
            let parent_path = path.parent().unwrap_or_default();
            let (parent, start) = if parent_path.is_empty() {
                (None, 0)
            } else {
                let Some(position) = self.outline_position_for_path(&parent_path) else {
                    otrace!("Outline::insert: parent is not in the outline");
                    continue;
                };
                let parent = self.rows[position];
                if !self.arena.get(parent).is_some_and(|node| node.is_expanded) {
                    otrace!(position, "Outline::insert: parent is collapsed");
                    continue;
                }
                (Some(parent), position + 1)
            };

            let parent_item = parent.and_then(|id| self.arena.get(id)).map(|node| &node.item);
            if local >= source.child_count(parent_item) {
                otrace!(local, "Outline::insert: index out of range");
                continue;
            }
            let item = source.child(local, parent_item);
            let at = self.insertion_point(start, &parent_path, local);
            let id = self.arena.insert(Node::new(item, path.clone(), parent));
            self.rows.insert(at, id);
            added.insert(id);
        }

        let mut inserted = IndexBatch::new(self.rows.len());
        for (position, id) in self.rows.iter().enumerate() {
            if added.contains(id) {
                inserted.push(position);
            }
        }
        let inserted = inserted.finish();
        odebug!(inserted = inserted.len(), "Outline::insert");
        self.project(
            RowChanges {
                inserted,
                ..RowChanges::default()
            },
            &[],
        )
    }

    /// Position for a new child with sibling index `local`: before the first present sibling
    /// with a greater index, else after the parent's whole subtree.
    fn insertion_point(&self, start: usize, parent_path: &IndexPath, local: usize) -> usize {
        let depth = parent_path.len();
        let mut position = start;
        while let Some(node) = self.outline_node(position) {
            if !parent_path.is_strict_prefix_of(&node.path) {
                break;
            }
            if node.path.len() == depth + 1 && node.path.as_slice()[depth] > local {
                break;
            }
            position += 1;
        }
        position
    }

    /// Removes the nodes at `paths` together with all of their descendants, in one batch.
    ///
    /// Paths are resolved before anything is removed. Afterwards, later siblings of each
    /// removed node (and their subtrees) are renumbered so paths keep matching the tree.
    pub fn delete(&mut self, paths: &[IndexPath]) -> RowChanges {
        let mut targets: Vec<IndexPath> = paths
            .iter()
            .filter(|path| !path.is_empty())
            .cloned()
            .collect();
        targets.sort();
        targets.dedup();

        let mut doomed = Vec::new();
        targets.retain(|path| {
            let Some(position) = self.outline_position_for_path(path) else {
                otrace!("Outline::delete: path is not in the outline");
                return false;
            };
            doomed.push(position);
            doomed.extend(self.descendant_positions(path));
            true
        });
        if targets.is_empty() {
            return RowChanges::default();
        }
        doomed.sort_unstable();
        doomed.dedup();

        let deleted = self.remove_positions(&doomed);
        self.renumber_after_delete(&targets);
        odebug!(deleted = deleted.len(), "Outline::delete");
        self.project(
            RowChanges {
                deleted,
                ..RowChanges::default()
            },
            &[],
        )
    }

    fn renumber_after_delete(&mut self, removed: &[IndexPath]) {
        for &id in &self.rows {
            let Some(node) = self.arena.get_mut(id) else {
                continue;
            };
            let original = node.path.clone();
            for path in removed {
                let depth = path.depth();
                if original.len() <= depth {
                    continue;
                }
                let (o, r) = (original.as_slice(), path.as_slice());
                if o[..depth] != r[..depth] || o[depth] <= r[depth] {
                    continue;
                }
                let current = node.path.as_slice()[depth];
                node.path.set(depth, current - 1);
            }
        }
    }

    /// Rebuilds the whole projection from the source.
    ///
    /// With `maintain_expanded`, every node whose item equals a previously expanded item is
    /// expanded again (the source's `should_auto_expand` takes precedence). Selection is
    /// carried over to the first new node with an equal item. Expansion here is never
    /// user-initiated, so no lifecycle hooks fire.
    pub fn reload<S>(&mut self, source: &S) -> RowChanges
    where
        S: TreeSource<Item = T> + ?Sized,
        T: PartialEq,
    {
        let maintain = self.options.maintain_expanded;
        let mut previous = Vec::new();
        for &id in &self.rows {
            let selected = self.selection.contains(&id);
            let Some(node) = self.arena.remove(id) else {
                continue;
            };
            let expanded = maintain && node.is_expanded;
            if expanded || selected {
                previous.push(Remembered {
                    item: node.item,
                    expanded,
                    selected,
                });
            }
        }
        self.clear_nodes();
        self.fill_roots(source);

        let remembered = |item: &T| previous.iter().any(|r| r.expanded && r.item == *item);
        let roots = self.rows.clone();
        for id in roots {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            if !should_expand(source, &node.item, &remembered) {
                continue;
            }
            if let Err(_err) = self.expand_in_outline(source, id, false, &remembered) {
                owarn!(error = %_err, "Outline::reload: expand failed");
            }
        }

        for r in previous.iter().filter(|r| r.selected) {
            let found = self.rows.iter().copied().find(|&id| {
                !self.selection.contains(&id)
                    && self.arena.get(id).is_some_and(|node| node.item == r.item)
            });
            if let Some(id) = found {
                self.selection.insert(id);
            }
        }

        odebug!(
            rows = self.rows.len(),
            remembered = previous.len(),
            "Outline::reload"
        );
        self.project_full()
    }

    /// Requests a redraw of the rows at `paths` without changing structure.
    ///
    /// When the source declares [`ItemIdentity::Refetch`], each item is first re-queried from
    /// its parent. Returns the active positions to reload; paths that are absent or filtered
    /// out are skipped.
    pub fn reload_items<S>(&mut self, source: &S, paths: &[IndexPath]) -> RowChanges
    where
        S: TreeSource<Item = T> + ?Sized,
    {
        let refetch = source.item_identity() == ItemIdentity::Refetch;
        let mut touched = Vec::new();
        for path in paths {
            let Some(id) = self.node_for_path(path) else {
                continue;
            };
            if refetch {
                self.refetch(source, id);
            }
            touched.push(id);
        }

        if self.filter.is_some() {
            return self.project(RowChanges::default(), &touched);
        }
        let mut reloaded = IndexBatch::new(self.rows.len());
        for (position, id) in self.rows.iter().enumerate() {
            if touched.contains(id) {
                reloaded.push(position);
            }
        }
        RowChanges {
            reloaded: reloaded.finish(),
            ..RowChanges::default()
        }
    }

    fn refetch<S>(&mut self, source: &S, id: NodeId)
    where
        S: TreeSource<Item = T> + ?Sized,
    {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let Some(local) = node.path.last() else {
            return;
        };
        let parent_item = node
            .parent
            .and_then(|parent| self.arena.get(parent))
            .map(|parent| &parent.item);
        if local >= source.child_count(parent_item) {
            owarn!(local, "Outline::reload_items: index out of range");
            return;
        }
        let item = source.child(local, parent_item);
        if let Some(node) = self.arena.get_mut(id) {
            node.item = item;
        }
    }
}

impl<T> core::fmt::Debug for Outline<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Outline")
            .field("options", &self.options)
            .field("outline_len", &self.rows.len())
            .field("nodes", &self.arena.len())
            .field("row_count", &self.row_count())
            .field("selected", &self.selection.len())
            .field("filtered", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}
