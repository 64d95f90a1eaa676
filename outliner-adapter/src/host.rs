use outliner::NodeId;

use crate::RowLayout;

/// Animation style hint passed along with every row instruction.
///
/// Playback is up to the host. The view never waits for an animation to finish.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowAnimation {
    None,
    #[default]
    Fade,
    /// Let the host pick.
    Automatic,
    Top,
    Bottom,
}

/// Identifies the node a cell toggles. Hand it back to [`crate::OutlineView::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ToggleHandle(pub(crate) NodeId);

impl ToggleHandle {
    pub fn node(&self) -> NodeId {
        self.0
    }
}

/// Everything a cell needs to render one outline row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellBinding {
    pub node: NodeId,
    pub depth: usize,
    pub is_expanded: bool,
    /// `true` when the item is expandable and the cell should show its toggle control.
    pub shows_toggle: bool,
    pub toggle: ToggleHandle,
    pub layout: RowLayout,
}

impl CellBinding {
    pub fn leading_indent(&self) -> u32 {
        self.layout.leading_indent(self.depth, self.shows_toggle)
    }
}

/// A renderable row produced by the host.
pub trait OutlineCell {
    /// Stable identity of a (possibly reused) cell. Expansion subscriptions are keyed by it.
    type Key: Clone + PartialEq;

    fn key(&self) -> Self::Key;

    /// Applies depth, expansion state, toggle visibility and the toggle handle.
    fn configure(&mut self, binding: &CellBinding);
}

/// The host scrolling-list widget.
///
/// Row indexes follow the [`outliner::RowChanges`] contract: deletes and reloads in
/// pre-change coordinates, inserts in post-change coordinates.
pub trait HostList<T> {
    type Cell: OutlineCell;

    /// Builds (or dequeues) a cell for `item`. The view configures it afterwards.
    fn make_cell(&mut self, item: &T) -> Self::Cell;

    /// Returned when a row is requested that cannot be served.
    fn placeholder_cell(&mut self) -> Self::Cell;

    fn insert_rows(&mut self, rows: &[usize], animation: RowAnimation);

    fn delete_rows(&mut self, rows: &[usize], animation: RowAnimation);

    fn reload_rows(&mut self, rows: &[usize], animation: RowAnimation);

    /// Drops every row and re-queries the row count.
    fn reload_data(&mut self);

    /// Opens a group of row instructions the host must apply in one pass.
    fn begin_updates(&mut self) {}

    fn end_updates(&mut self) {}

    /// The node bound to the cell `key` was expanded or collapsed by the user.
    fn expansion_changed(&mut self, key: &<Self::Cell as OutlineCell>::Key, is_expanded: bool) {
        let _ = (key, is_expanded);
    }
}
