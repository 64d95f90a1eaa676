use outliner::{
    FilterPredicate, IndexPath, Node, NodeId, Outline, OutlineError, RowChanges, TreeSource,
};

use crate::{
    CellBinding, ExpansionObservers, HostList, OutlineCell, PendingTask, TaskQueue, ToggleHandle,
    ViewOptions,
};

/// Key type of the cells `H` produces for items of type `T`.
pub type CellKey<T, H> = <<H as HostList<T>>::Cell as OutlineCell>::Key;

/// A framework-neutral controller that wraps an [`outliner::Outline`] and drives a host list.
///
/// It owns the (optional) tree source and the host, so it can answer the host's row queries and
/// replay every outline change as row instructions. Adapters drive it by calling:
/// - `row_count` / `cell_for_row` / `row_height` when the host lays out rows
/// - `did_select_row` / `did_deselect_row` from the host's selection callbacks
/// - `toggle` with the handle a cell received at binding time
/// - the structural entry points when the underlying tree changes
///
/// Failures are logged and dropped; the host only ever sees a no-op.
pub struct OutlineView<S: TreeSource, H: HostList<S::Item>> {
    outline: Outline<S::Item>,
    source: Option<S>,
    host: H,
    options: ViewOptions<S::Item>,
    observers: ExpansionObservers<CellKey<S::Item, H>>,
    tasks: TaskQueue,
}

impl<S: TreeSource, H: HostList<S::Item>> OutlineView<S, H> {
    /// Creates a view without a tree source. Every row query is answered with a placeholder
    /// until [`Self::set_source`] is called.
    pub fn new(host: H, options: ViewOptions<S::Item>) -> Self {
        Self {
            outline: Outline::new(options.outline.clone()),
            source: None,
            host,
            options,
            observers: ExpansionObservers::new(),
            tasks: TaskQueue::new(),
        }
    }

    pub fn with_source(host: H, source: S, options: ViewOptions<S::Item>) -> Self {
        let mut view = Self::new(host, options);
        view.set_source(Some(source));
        view
    }

    pub fn outline(&self) -> &Outline<S::Item> {
        &self.outline
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    /// Mutable access to the tree. After changing it, report the change through
    /// `insert_rows`, `delete_rows`, `reload_rows` or `reload_data`.
    pub fn source_mut(&mut self) -> Option<&mut S> {
        self.source.as_mut()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn options(&self) -> &ViewOptions<S::Item> {
        &self.options
    }

    pub fn set_options(&mut self, options: ViewOptions<S::Item>) {
        self.outline.set_options(options.outline.clone());
        self.options = options;
    }

    pub fn observers(&self) -> &ExpansionObservers<CellKey<S::Item, H>> {
        &self.observers
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Replaces the tree source and restarts from scratch: expansion, selection, filter and
    /// subscriptions are dropped, the top level is materialized and the host reloads.
    ///
    /// `None` empties the view.
    pub fn set_source(&mut self, source: Option<S>) {
        self.tasks.clear();
        self.observers.clear();
        self.outline = Outline::new(self.options.outline.clone());
        if let Some(source) = &source {
            self.outline.populate_roots(source);
        }
        self.source = source;
        adebug!(
            rows = self.outline.row_count(),
            has_source = self.source.is_some(),
            "OutlineView::set_source"
        );
        self.host.reload_data();
    }

    // Row queries.

    pub fn row_count(&self) -> usize {
        self.outline.row_count()
    }

    pub fn row(&self, position: usize) -> Option<&Node<S::Item>> {
        self.outline.node_at(position)
    }

    /// Builds and configures the cell for `position`, and subscribes it to that node's
    /// expansion changes.
    ///
    /// Without a source, or for a position past the end, the host's placeholder is returned.
    pub fn cell_for_row(&mut self, position: usize) -> H::Cell {
        let Some(source) = &self.source else {
            awarn!(position, "OutlineView::cell_for_row: no tree source configured");
            return self.host.placeholder_cell();
        };
        let Some((id, node)) = self
            .outline
            .id_at(position)
            .and_then(|id| self.outline.node(id).map(|node| (id, node)))
        else {
            awarn!(
                position,
                rows = self.outline.row_count(),
                "OutlineView::cell_for_row: position out of range"
            );
            return self.host.placeholder_cell();
        };

        let binding = CellBinding {
            node: id,
            depth: node.depth(),
            is_expanded: node.is_expanded(),
            shows_toggle: source.is_expandable(node.item()),
            toggle: ToggleHandle(id),
            layout: self.options.layout,
        };
        let mut cell = self.host.make_cell(node.item());
        cell.configure(&binding);
        if self.observers.bind(cell.key(), id).is_some() {
            atrace!(position, "OutlineView::cell_for_row: cell rebound");
        }
        cell
    }

    /// The host stopped displaying the cell `key`; drops its subscription.
    pub fn end_displaying(&mut self, key: &CellKey<S::Item, H>) {
        self.observers.unbind(key);
    }

    pub fn row_height(&self, position: usize) -> u32 {
        let base = self.options.base_row_height;
        match (&self.options.height_for_item, self.outline.node_at(position)) {
            (Some(f), Some(node)) => f(node.item()),
            _ => base,
        }
    }

    pub fn should_highlight_row(&self, position: usize) -> bool {
        let Some(node) = self.outline.node_at(position) else {
            return false;
        };
        self.options
            .should_highlight
            .as_ref()
            .is_none_or(|f| f(node.item()))
    }

    // Selection.

    pub fn did_select_row(&mut self, position: usize) {
        let Some(id) = self.outline.id_at(position) else {
            awarn!(position, "OutlineView::did_select_row: position out of range");
            return;
        };
        self.outline.select(id);
        if let (Some(f), Some(node)) = (&self.options.on_select, self.outline.node(id)) {
            f(position, node.item());
        }
    }

    /// Deselects the row. If the filter was keeping it visible only for the selection, hiding
    /// it is posted as a task: the host is still inside its callback.
    pub fn did_deselect_row(&mut self, position: usize) {
        let Some(id) = self.outline.id_at(position) else {
            awarn!(position, "OutlineView::did_deselect_row: position out of range");
            return;
        };
        self.outline.deselect(id);
        if self.outline.is_protected(id) {
            atrace!(position, "OutlineView::did_deselect_row: release posted");
            self.tasks.post(PendingTask::ReleaseProtection(id));
        }
    }

    /// Runs every posted task. Each mutation entry point calls this first.
    pub fn run_pending(&mut self) {
        for task in self.tasks.drain() {
            match task {
                PendingTask::ReleaseProtection(id) => {
                    let changes = self.outline.release_protection(id);
                    self.dispatch(&changes);
                }
            }
        }
    }

    // Expansion.

    /// User-initiated toggle, fired by a cell through the handle it was bound with.
    pub fn toggle(&mut self, handle: ToggleHandle) {
        self.run_pending();
        let result = match &self.source {
            Some(source) => self.outline.toggle(source, handle.0),
            None => Err(OutlineError::NoSource),
        };
        if self.apply(result) {
            self.notify_expansion(handle.0);
        }
    }

    pub fn toggle_row(&mut self, position: usize) {
        let Some(id) = self.outline.id_at(position) else {
            awarn!(position, "OutlineView::toggle_row: position out of range");
            return;
        };
        self.toggle(ToggleHandle(id));
    }

    /// Programmatic expand or collapse. Lifecycle hooks do not fire.
    pub fn set_expanded(&mut self, node: NodeId, expanded: bool) {
        self.run_pending();
        let result = match (&self.source, expanded) {
            (None, _) => Err(OutlineError::NoSource),
            (Some(source), true) => self.outline.expand(source, node, false),
            (Some(_), false) => self.outline.collapse(node, false),
        };
        if self.apply(result) {
            self.notify_expansion(node);
        }
    }

    // Structural edits.

    pub fn insert_rows(&mut self, paths: &[IndexPath]) {
        self.run_pending();
        let result = match &self.source {
            Some(source) => Ok(self.outline.insert(source, paths)),
            None => Err(OutlineError::NoSource),
        };
        self.apply(result);
    }

    pub fn delete_rows(&mut self, paths: &[IndexPath]) {
        self.run_pending();
        let changes = self.outline.delete(paths);
        self.dispatch(&changes);
    }

    pub fn reload_rows(&mut self, paths: &[IndexPath]) {
        self.run_pending();
        let result = match &self.source {
            Some(source) => Ok(self.outline.reload_items(source, paths)),
            None => Err(OutlineError::NoSource),
        };
        self.apply(result);
    }

    /// Rebuilds the outline from the source and reloads the host.
    pub fn reload_data(&mut self)
    where
        S::Item: PartialEq,
    {
        self.run_pending();
        let result = match &self.source {
            Some(source) => Ok(self.outline.reload(source)),
            None => Err(OutlineError::NoSource),
        };
        self.apply(result);
    }

    /// Installs, replaces or clears (`None`) the filter.
    ///
    /// With `animated`, the host receives the row delta; otherwise it reloads.
    pub fn set_filter(
        &mut self,
        predicate: Option<FilterPredicate<S::Item>>,
        maintain_selection: bool,
        animated: bool,
    ) {
        self.run_pending();
        let changes = self.outline.apply_filter(predicate, maintain_selection);
        if animated {
            self.dispatch(&changes);
        } else {
            self.dispatch(&RowChanges::full());
        }
    }

    fn apply(&mut self, result: Result<RowChanges, OutlineError>) -> bool {
        match result {
            Ok(changes) => {
                self.dispatch(&changes);
                true
            }
            Err(_err) => {
                awarn!(error = %_err, "OutlineView: operation ignored");
                false
            }
        }
    }

    /// Replays `changes` on the host, grouping mixed instructions into one update pass.
    fn dispatch(&mut self, changes: &RowChanges) {
        if changes.is_empty() {
            return;
        }
        adebug!(
            deleted = changes.deleted.len(),
            inserted = changes.inserted.len(),
            reloaded = changes.reloaded.len(),
            full_reload = changes.full_reload,
            "OutlineView::dispatch"
        );

        if changes.full_reload {
            self.host.reload_data();
        } else {
            let grouped = changes.needs_grouping();
            if grouped {
                self.host.begin_updates();
            }
            if !changes.deleted.is_empty() {
                self.host
                    .delete_rows(&changes.deleted, self.options.delete_animation);
            }
            if !changes.inserted.is_empty() {
                self.host
                    .insert_rows(&changes.inserted, self.options.insert_animation);
            }
            if !changes.reloaded.is_empty() {
                self.host
                    .reload_rows(&changes.reloaded, self.options.reload_animation);
            }
            if grouped {
                self.host.end_updates();
            }
        }

        let outline = &self.outline;
        self.observers.retain(|node| outline.contains(node));
    }

    fn notify_expansion(&mut self, node: NodeId) {
        let Some(expanded) = self.outline.node(node).map(|n| n.is_expanded()) else {
            return;
        };
        for key in self.observers.subscribers(node) {
            self.host.expansion_changed(key, expanded);
        }
    }
}

impl<S, H> core::fmt::Debug for OutlineView<S, H>
where
    S: TreeSource,
    H: HostList<S::Item>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutlineView")
            .field("outline", &self.outline)
            .field("has_source", &self.source.is_some())
            .field("options", &self.options)
            .field("subscriptions", &self.observers.len())
            .field("pending_tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}
