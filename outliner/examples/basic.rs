// Example: expand/collapse a small tree and print the row deltas a list widget would replay.
use outliner::{Outline, OutlineOptions, TreeSource};

struct Dirs;

impl Dirs {
    fn children(parent: Option<&&'static str>) -> &'static [&'static str] {
        match parent.copied() {
            None => &["src", "Cargo.toml"],
            Some("src") => &["lib.rs", "outline", "tests.rs"],
            Some("outline") => &["filter.rs", "flatten.rs"],
            Some(_) => &[],
        }
    }
}

impl TreeSource for Dirs {
    type Item = &'static str;

    fn child_count(&self, parent: Option<&&'static str>) -> usize {
        Self::children(parent).len()
    }

    fn child(&self, index: usize, parent: Option<&&'static str>) -> &'static str {
        Self::children(parent)[index]
    }

    fn is_expandable(&self, item: &&'static str) -> bool {
        !Self::children(Some(item)).is_empty()
    }
}

fn print_rows(o: &Outline<&'static str>) {
    for (_, node) in o.iter() {
        let marker = match (Dirs.is_expandable(node.item()), node.is_expanded()) {
            (true, true) => "v ",
            (true, false) => "> ",
            (false, _) => "  ",
        };
        println!("{}{marker}{}", "  ".repeat(node.depth()), node.item());
    }
}

fn main() {
    let options = OutlineOptions::<&'static str>::new()
        .with_on_did_expand(Some(|item: &&'static str| println!("(expanded {item})")));
    let mut o = Outline::new(options);
    o.populate_roots(&Dirs);

    let Some(src) = o.find(|item| *item == "src") else {
        return;
    };
    match o.toggle(&Dirs, src) {
        Ok(changes) => println!("toggle src: {changes:?}"),
        Err(err) => println!("toggle src failed: {err}"),
    }
    if let Some(outline) = o.find(|item| *item == "outline") {
        if let Ok(changes) = o.toggle(&Dirs, outline) {
            println!("toggle outline: {changes:?}");
        }
    }
    print_rows(&o);

    if let Ok(changes) = o.collapse(src, true) {
        println!("collapse src: {changes:?}");
    }
    print_rows(&o);
}
