use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::batch::IndexBatch;
use crate::key::NodeSet;
use crate::node::NodeId;
use crate::{FilterPredicate, IndexPath, Outline, RowChanges};

/// State of an active filter. `rows` is always an order-preserving subsequence of the
/// outline list.
#[derive(Clone)]
pub(crate) struct FilterState<T> {
    pub(crate) predicate: FilterPredicate<T>,
    pub(crate) maintain_selection: bool,
    pub(crate) rows: Vec<NodeId>,
    /// Nodes kept visible despite failing the predicate, because they are selected or lie
    /// on a selected node's ancestor chain.
    pub(crate) protected: NodeSet,
}

/// The outcome of evaluating a predicate against the outline list.
///
/// Both lists hold outline positions, sorted ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Exclusion {
    /// Rows to hide.
    pub excluded: Vec<usize>,
    /// Rows that would have been hidden but are kept for the selection.
    pub protected: Vec<usize>,
}

impl<T> Outline<T> {
    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    pub fn filter_predicate(&self) -> Option<&FilterPredicate<T>> {
        self.filter.as_ref().map(|filter| &filter.predicate)
    }

    pub fn is_protected(&self, id: NodeId) -> bool {
        self.filter
            .as_ref()
            .is_some_and(|filter| filter.protected.contains(&id))
    }

    /// Outline positions of the protected nodes, sorted ascending.
    pub fn protected_positions(&self) -> Vec<usize> {
        let Some(filter) = &self.filter else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, id)| filter.protected.contains(id))
            .map(|(position, _)| position)
            .collect()
    }

    /// Computes which outline rows `predicate` hides.
    ///
    /// 1. A row failing the predicate is excluded, and so is its whole expanded subtree.
    /// 2. A row with descendant rows, all of them excluded, is excluded too. Rows are visited
    ///    bottom-up, so emptiness propagates through every level.
    /// 3. With `maintain_selection`, an excluded row that is selected or is an ancestor of a
    ///    selected row is protected instead.
    pub fn compute_excluded(
        &self,
        predicate: &dyn Fn(&T) -> bool,
        maintain_selection: bool,
    ) -> Exclusion {
        let count = self.rows.len();
        let mut excluded = vec![false; count];

        for position in 0..count {
            if excluded[position] {
                continue;
            }
            let Some(node) = self.outline_node(position) else {
                continue;
            };
            if predicate(&node.item) {
                continue;
            }
            excluded[position] = true;
            if node.is_expanded {
                for descendant in self.descendant_range(position) {
                    excluded[descendant] = true;
                }
            }
        }

        for position in (0..count).rev() {
            if excluded[position] {
                continue;
            }
            let mut descendants = self.descendant_range(position);
            if !descendants.is_empty() && descendants.all(|d| excluded[d]) {
                excluded[position] = true;
            }
        }

        let mut protected = Vec::new();
        if maintain_selection {
            let selected: Vec<&IndexPath> = self
                .selection
                .iter()
                .filter_map(|&id| self.arena.get(id))
                .map(|node| &node.path)
                .collect();
            for position in 0..count {
                if !excluded[position] {
                    continue;
                }
                let Some(node) = self.outline_node(position) else {
                    continue;
                };
                let keep = selected
                    .iter()
                    .any(|path| node.path == **path || node.path.is_strict_prefix_of(path));
                if keep {
                    excluded[position] = false;
                    protected.push(position);
                }
            }
        }

        Exclusion {
            excluded: (0..count).filter(|&p| excluded[p]).collect(),
            protected,
        }
    }

    /// Installs, replaces or clears (`None`) the filter.
    ///
    /// Returns the delta from the previously displayed sequence to the new one: deletes in
    /// old coordinates, then inserts in new coordinates.
    pub fn apply_filter(
        &mut self,
        predicate: Option<FilterPredicate<T>>,
        maintain_selection: bool,
    ) -> RowChanges {
        let previous = match self.filter.take() {
            Some(filter) => filter.rows,
            None => self.rows.clone(),
        };

        let Some(predicate) = predicate else {
            let changes = diff(&previous, &self.rows);
            odebug!(
                inserted = changes.inserted.len(),
                "Outline::apply_filter: cleared"
            );
            return changes;
        };

        self.filter = Some(FilterState {
            predicate,
            maintain_selection,
            rows: Vec::new(),
            protected: NodeSet::default(),
        });
        self.refilter();
        let changes = diff(&previous, self.active());
        odebug!(
            deleted = changes.deleted.len(),
            inserted = changes.inserted.len(),
            rows = self.row_count(),
            "Outline::apply_filter"
        );
        changes
    }

    /// Drops the protection of `id` after it was deselected, hiding it and any protected
    /// ancestors the remaining selection no longer justifies.
    ///
    /// A node that is still selected stays protected and nothing changes.
    pub fn release_protection(&mut self, id: NodeId) -> RowChanges {
        if !self.is_protected(id) {
            otrace!("Outline::release_protection: node is not protected");
            return RowChanges::default();
        }
        let Some(previous) = self.refilter() else {
            return RowChanges::default();
        };
        let changes = diff(&previous, self.active());
        odebug!(
            deleted = changes.deleted.len(),
            "Outline::release_protection"
        );
        changes
    }

    /// Re-derives the filtered sequence from the outline list, returning the previous one.
    ///
    /// Returns `None` when no filter is active.
    fn refilter(&mut self) -> Option<Vec<NodeId>> {
        let filter = self.filter.as_ref()?;
        let predicate = Arc::clone(&filter.predicate);
        let exclusion = self.compute_excluded(&*predicate, filter.maintain_selection);

        let mut hidden = exclusion.excluded.iter().copied().peekable();
        let mut rows = Vec::with_capacity(self.rows.len() - exclusion.excluded.len());
        for (position, &id) in self.rows.iter().enumerate() {
            if hidden.peek() == Some(&position) {
                hidden.next();
            } else {
                rows.push(id);
            }
        }
        let protected: NodeSet = exclusion
            .protected
            .iter()
            .map(|&position| self.rows[position])
            .collect();

        let filter = self.filter.as_mut()?;
        filter.protected = protected;
        Some(core::mem::replace(&mut filter.rows, rows))
    }

    /// Translates an outline-level change into active-sequence coordinates.
    ///
    /// Without a filter the outline change is already in the right coordinates. With one,
    /// the filtered sequence is re-derived and diffed; `touched` names nodes whose rows
    /// should be reloaded if they stay visible.
    pub(crate) fn project(&mut self, outline: RowChanges, touched: &[NodeId]) -> RowChanges {
        let Some(previous) = self.refilter() else {
            return outline;
        };
        let next = self.active();
        let mut changes = diff(&previous, next);
        if !touched.is_empty() {
            let visible: NodeSet = next.iter().copied().collect();
            let mut reloaded = IndexBatch::new(previous.len());
            for (position, id) in previous.iter().enumerate() {
                if touched.contains(id) && visible.contains(id) {
                    reloaded.push(position);
                }
            }
            changes.reloaded = reloaded.finish();
        }
        changes
    }

    /// Re-derives the filtered sequence (if any) after the outline was rebuilt.
    pub(crate) fn project_full(&mut self) -> RowChanges {
        self.refilter();
        RowChanges::full()
    }
}

/// Delete-then-insert delta between two subsequences of the same outline order.
fn diff(previous: &[NodeId], next: &[NodeId]) -> RowChanges {
    let before: NodeSet = previous.iter().copied().collect();
    let after: NodeSet = next.iter().copied().collect();

    let mut deleted = IndexBatch::new(previous.len());
    for (position, id) in previous.iter().enumerate() {
        if !after.contains(id) {
            deleted.push(position);
        }
    }
    let mut inserted = IndexBatch::new(next.len());
    for (position, id) in next.iter().enumerate() {
        if !before.contains(id) {
            inserted.push(position);
        }
    }
    RowChanges {
        deleted: deleted.finish(),
        inserted: inserted.finish(),
        ..RowChanges::default()
    }
}
