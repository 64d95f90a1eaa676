use alloc::sync::Arc;

use outliner::OutlineOptions;

use crate::{RowAnimation, RowLayout};

/// Per-item row height override.
pub type HeightFn<T> = Arc<dyn Fn(&T) -> u32 + Send + Sync>;

pub type HighlightFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Fired with the selected row's active position and item.
pub type SelectFn<T> = Arc<dyn Fn(usize, &T) + Send + Sync>;

/// Configuration for [`crate::OutlineView`].
pub struct ViewOptions<T> {
    /// Passed to the wrapped [`outliner::Outline`].
    pub outline: OutlineOptions<T>,

    /// Row height used when `height_for_item` is unset.
    pub base_row_height: u32,
    pub height_for_item: Option<HeightFn<T>>,
    /// Rows are highlightable unless this returns `false`.
    pub should_highlight: Option<HighlightFn<T>>,
    pub on_select: Option<SelectFn<T>>,

    pub insert_animation: RowAnimation,
    pub delete_animation: RowAnimation,
    pub reload_animation: RowAnimation,

    pub layout: RowLayout,
}

impl<T> Clone for ViewOptions<T> {
    fn clone(&self) -> Self {
        Self {
            outline: self.outline.clone(),
            base_row_height: self.base_row_height,
            height_for_item: self.height_for_item.clone(),
            should_highlight: self.should_highlight.clone(),
            on_select: self.on_select.clone(),
            insert_animation: self.insert_animation,
            delete_animation: self.delete_animation,
            reload_animation: self.reload_animation,
            layout: self.layout,
        }
    }
}

impl<T> Default for ViewOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewOptions<T> {
    pub fn new() -> Self {
        Self {
            outline: OutlineOptions::new(),
            base_row_height: 44,
            height_for_item: None,
            should_highlight: None,
            on_select: None,
            insert_animation: RowAnimation::Fade,
            delete_animation: RowAnimation::Fade,
            reload_animation: RowAnimation::None,
            layout: RowLayout::DEFAULT,
        }
    }

    pub fn with_outline(mut self, outline: OutlineOptions<T>) -> Self {
        self.outline = outline;
        self
    }

    pub fn with_base_row_height(mut self, base_row_height: u32) -> Self {
        self.base_row_height = base_row_height;
        self
    }

    pub fn with_height_for_item(
        mut self,
        f: Option<impl Fn(&T) -> u32 + Send + Sync + 'static>,
    ) -> Self {
        self.height_for_item = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_should_highlight(
        mut self,
        f: Option<impl Fn(&T) -> bool + Send + Sync + 'static>,
    ) -> Self {
        self.should_highlight = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_select(mut self, f: Option<impl Fn(usize, &T) + Send + Sync + 'static>) -> Self {
        self.on_select = f.map(|f| Arc::new(f) as _);
        self
    }

    /// Sets the insert and delete animations together.
    pub fn with_structural_animation(mut self, animation: RowAnimation) -> Self {
        self.insert_animation = animation;
        self.delete_animation = animation;
        self
    }

    pub fn with_reload_animation(mut self, animation: RowAnimation) -> Self {
        self.reload_animation = animation;
        self
    }

    pub fn with_layout(mut self, layout: RowLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl<T> core::fmt::Debug for ViewOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewOptions")
            .field("outline", &self.outline)
            .field("base_row_height", &self.base_row_height)
            .field("height_for_item", &self.height_for_item.is_some())
            .field("should_highlight", &self.should_highlight.is_some())
            .field("on_select", &self.on_select.is_some())
            .field("insert_animation", &self.insert_animation)
            .field("delete_animation", &self.delete_animation)
            .field("reload_animation", &self.reload_animation)
            .field("layout", &self.layout)
            .finish()
    }
}
