// Example: filter an expanded outline while keeping the selected row and its ancestors visible.
use std::sync::Arc;

use outliner::{Outline, TreeSource};

struct Menu;

fn children(parent: Option<&&'static str>) -> &'static [&'static str] {
    match parent.copied() {
        None => &["File", "Edit"],
        Some("File") => &["Open", "Recent"],
        Some("Recent") => &["notes.txt", "draft.md"],
        Some("Edit") => &["Undo", "Redo"],
        Some(_) => &[],
    }
}

impl TreeSource for Menu {
    type Item = &'static str;

    fn child_count(&self, parent: Option<&&'static str>) -> usize {
        children(parent).len()
    }

    fn child(&self, index: usize, parent: Option<&&'static str>) -> &'static str {
        children(parent)[index]
    }

    fn is_expandable(&self, item: &&'static str) -> bool {
        !children(Some(item)).is_empty()
    }

    fn should_auto_expand(&self, _item: &&'static str) -> Option<bool> {
        Some(true)
    }
}

fn names(o: &Outline<&'static str>) -> Vec<&'static str> {
    o.iter().map(|(_, node)| *node.item()).collect()
}

fn main() {
    let mut o = Outline::default();
    o.reload(&Menu);
    println!("outline: {:?}", names(&o));

    if let Some(draft) = o.find(|item| *item == "draft.md") {
        o.select(draft);
    }

    let changes = o.apply_filter(Some(Arc::new(|item: &&'static str| item.starts_with('R'))), true);
    println!("filter R*: {changes:?}");
    println!("rows: {:?} protected: {:?}", names(&o), o.protected_positions());

    if let Some(draft) = o.find(|item| *item == "draft.md") {
        o.deselect(draft);
        let changes = o.release_protection(draft);
        println!("deselect draft.md: {changes:?}");
    }
    println!("rows: {:?}", names(&o));

    let changes = o.apply_filter(None, true);
    println!("clear: {changes:?}");
}
