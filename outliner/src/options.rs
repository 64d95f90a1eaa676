use alloc::sync::Arc;

/// A callback fired with the item whose row is being expanded or collapsed.
pub type ExpansionHook<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A predicate over items used by the filter layer.
pub type FilterPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Configuration for [`crate::Outline`].
///
/// Cheap to clone: callbacks are stored in `Arc`s.
pub struct OutlineOptions<T> {
    /// Remember which items were expanded across a reload and re-expand item-equal nodes.
    pub maintain_expanded: bool,

    /// Fired before a user-initiated expand. Never fired for reload-driven expansion.
    pub on_will_expand: Option<ExpansionHook<T>>,
    /// Fired after a user-initiated expand has been spliced into the outline.
    pub on_did_expand: Option<ExpansionHook<T>>,
    pub on_will_collapse: Option<ExpansionHook<T>>,
    pub on_did_collapse: Option<ExpansionHook<T>>,
}

impl<T> Clone for OutlineOptions<T> {
    fn clone(&self) -> Self {
        Self {
            maintain_expanded: self.maintain_expanded,
            on_will_expand: self.on_will_expand.clone(),
            on_did_expand: self.on_did_expand.clone(),
            on_will_collapse: self.on_will_collapse.clone(),
            on_did_collapse: self.on_did_collapse.clone(),
        }
    }
}

impl<T> Default for OutlineOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OutlineOptions<T> {
    pub fn new() -> Self {
        Self {
            maintain_expanded: false,
            on_will_expand: None,
            on_did_expand: None,
            on_will_collapse: None,
            on_did_collapse: None,
        }
    }

    pub fn with_maintain_expanded(mut self, maintain_expanded: bool) -> Self {
        self.maintain_expanded = maintain_expanded;
        self
    }

    pub fn with_on_will_expand(
        mut self,
        f: Option<impl Fn(&T) + Send + Sync + 'static>,
    ) -> Self {
        self.on_will_expand = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_did_expand(mut self, f: Option<impl Fn(&T) + Send + Sync + 'static>) -> Self {
        self.on_did_expand = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_will_collapse(
        mut self,
        f: Option<impl Fn(&T) + Send + Sync + 'static>,
    ) -> Self {
        self.on_will_collapse = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_did_collapse(
        mut self,
        f: Option<impl Fn(&T) + Send + Sync + 'static>,
    ) -> Self {
        self.on_did_collapse = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl<T> core::fmt::Debug for OutlineOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutlineOptions")
            .field("maintain_expanded", &self.maintain_expanded)
            .field("on_will_expand", &self.on_will_expand.is_some())
            .field("on_did_expand", &self.on_did_expand.is_some())
            .field("on_will_collapse", &self.on_will_collapse.is_some())
            .field("on_did_collapse", &self.on_did_collapse.is_some())
            .finish()
    }
}
