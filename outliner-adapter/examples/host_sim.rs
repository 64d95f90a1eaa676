// Example: a console "list widget" driven by `OutlineView`.
//
// The host implements `HostList`; the view answers row queries and replays every change as
// batched row instructions. Cells get a toggle handle they hand back on tap.
use std::sync::Arc;

use outliner::TreeSource;
use outliner_adapter::{
    CellBinding, HostList, OutlineCell, OutlineView, RowAnimation, ToggleHandle, ViewOptions,
};

struct Topics;

fn children(parent: Option<&&'static str>) -> &'static [&'static str] {
    match parent.copied() {
        None => &["Rust", "Go"],
        Some("Rust") => &["Ownership", "Traits", "Async"],
        Some("Async") => &["Futures", "Executors"],
        Some("Go") => &["Goroutines"],
        Some(_) => &[],
    }
}

impl TreeSource for Topics {
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
}

struct Line {
    id: usize,
    text: &'static str,
    binding: Option<CellBinding>,
}

impl Line {
    fn render(&self) -> String {
        let Some(binding) = &self.binding else {
            return "<placeholder>".to_string();
        };
        let glyph = match (binding.shows_toggle, binding.is_expanded) {
            (true, true) => "▾",
            (true, false) => "▸",
            (false, _) => " ",
        };
        let indent = " ".repeat(binding.leading_indent() as usize / 9);
        format!("{indent}{glyph} {}", self.text)
    }
}

impl OutlineCell for Line {
    type Key = usize;

    fn key(&self) -> usize {
        self.id
    }

    fn configure(&mut self, binding: &CellBinding) {
        self.binding = Some(*binding);
    }
}

#[derive(Default)]
struct Console {
    next_id: usize,
}

impl HostList<&'static str> for Console {
    type Cell = Line;

    fn make_cell(&mut self, item: &&'static str) -> Line {
        self.next_id += 1;
        Line {
            id: self.next_id,
            text: *item,
            binding: None,
        }
    }

    fn placeholder_cell(&mut self) -> Line {
        Line {
            id: 0,
            text: "",
            binding: None,
        }
    }

    fn insert_rows(&mut self, rows: &[usize], animation: RowAnimation) {
        println!("  insert {rows:?} ({animation:?})");
    }

    fn delete_rows(&mut self, rows: &[usize], animation: RowAnimation) {
        println!("  delete {rows:?} ({animation:?})");
    }

    fn reload_rows(&mut self, rows: &[usize], animation: RowAnimation) {
        println!("  reload {rows:?} ({animation:?})");
    }

    fn reload_data(&mut self) {
        println!("  reload all");
    }

    fn begin_updates(&mut self) {
        println!("  begin updates");
    }

    fn end_updates(&mut self) {
        println!("  end updates");
    }

    fn expansion_changed(&mut self, key: &usize, is_expanded: bool) {
        println!("  cell #{key} expanded={is_expanded}");
    }
}

fn draw(view: &mut OutlineView<Topics, Console>) -> Vec<ToggleHandle> {
    let mut handles = Vec::new();
    for row in 0..view.row_count() {
        let line = view.cell_for_row(row);
        println!("{:>3} | {}", row, line.render());
        if let Some(binding) = line.binding {
            handles.push(binding.toggle);
        }
    }
    handles
}

fn main() {
    println!("set source");
    let mut view = OutlineView::with_source(Console::default(), Topics, ViewOptions::new());
    let handles = draw(&mut view);

    println!("tap Rust");
    view.toggle(handles[0]);
    let handles = draw(&mut view);

    println!("tap Async");
    view.toggle(handles[3]);
    draw(&mut view);

    println!("select Futures, filter to F*");
    view.did_select_row(4);
    view.set_filter(
        Some(Arc::new(|item: &&'static str| item.starts_with('F'))),
        true,
        true,
    );
    draw(&mut view);

    println!("deselect Futures");
    view.did_deselect_row(2);
    view.run_pending();
    draw(&mut view);

    println!("clear filter");
    view.set_filter(None, true, true);
    draw(&mut view);
}
