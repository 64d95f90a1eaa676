use crate::*;

use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + ((self.next_u64() >> 16) % span) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() >> 33) & 1 == 1
    }
}

#[derive(Clone, Debug)]
struct Entry {
    name: &'static str,
    expandable: bool,
    children: Vec<Entry>,
}

fn leaf(name: &'static str) -> Entry {
    Entry {
        name,
        expandable: false,
        children: Vec::new(),
    }
}

fn branch(name: &'static str, children: Vec<Entry>) -> Entry {
    Entry {
        name,
        expandable: true,
        children,
    }
}

#[derive(Clone, Debug, Default)]
struct Tree {
    roots: Vec<Entry>,
    auto_expand: Option<Vec<&'static str>>,
    identity: ItemIdentity,
}

impl Tree {
    fn new(roots: Vec<Entry>) -> Self {
        Self {
            roots,
            ..Self::default()
        }
    }

    fn find<'a>(entries: &'a [Entry], name: &str) -> Option<&'a Entry> {
        for entry in entries {
            if entry.name == name {
                return Some(entry);
            }
            if let Some(found) = Self::find(&entry.children, name) {
                return Some(found);
            }
        }
        None
    }

    fn find_mut<'a>(entries: &'a mut [Entry], name: &str) -> Option<&'a mut Entry> {
        for entry in entries.iter_mut() {
            if entry.name == name {
                return Some(entry);
            }
            if let Some(found) = Self::find_mut(&mut entry.children, name) {
                return Some(found);
            }
        }
        None
    }

    fn entry_mut(&mut self, name: &str) -> &mut Entry {
        Self::find_mut(&mut self.roots, name).unwrap()
    }

    fn children(&self, parent: Option<&&'static str>) -> &[Entry] {
        match parent {
            None => &self.roots,
            Some(name) => Self::find(&self.roots, name).map_or(&[][..], |e| e.children.as_slice()),
        }
    }
}

impl TreeSource for Tree {
    type Item = &'static str;

    fn child_count(&self, parent: Option<&&'static str>) -> usize {
        self.children(parent).len()
    }

    fn child(&self, index: usize, parent: Option<&&'static str>) -> &'static str {
        self.children(parent)[index].name
    }

    fn is_expandable(&self, item: &&'static str) -> bool {
        Self::find(&self.roots, item).is_some_and(|e| e.expandable)
    }

    fn should_auto_expand(&self, item: &&'static str) -> Option<bool> {
        self.auto_expand.as_ref().map(|names| names.contains(item))
    }

    fn item_identity(&self) -> ItemIdentity {
        self.identity
    }
}

/// `A[B[D, E], C]`
fn sample() -> Tree {
    Tree::new(vec![branch(
        "A",
        vec![branch("B", vec![leaf("D"), leaf("E")]), leaf("C")],
    )])
}

fn names(o: &Outline<&'static str>) -> Vec<&'static str> {
    o.iter().map(|(_, node)| *node.item()).collect()
}

fn outline_names(o: &Outline<&'static str>) -> Vec<&'static str> {
    o.outline_rows()
        .iter()
        .map(|&id| *o.node(id).unwrap().item())
        .collect()
}

fn id(o: &Outline<&'static str>, name: &str) -> NodeId {
    o.outline_rows()
        .iter()
        .copied()
        .find(|&id| o.node(id).is_some_and(|n| *n.item() == name))
        .unwrap()
}

/// Outline with `A` and `B` expanded: `[A, B, D, E, C]`.
fn expanded_sample(tree: &Tree, options: OutlineOptions<&'static str>) -> Outline<&'static str> {
    let mut o = Outline::new(options);
    o.populate_roots(tree);
    let a = id(&o, "A");
    o.expand(tree, a, false).unwrap();
    let b = id(&o, "B");
    o.expand(tree, b, false).unwrap();
    o
}

fn predicate<T>(f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Option<FilterPredicate<T>> {
    Some(Arc::new(f))
}

/// Checks that the outline list is exactly the pre-order walk of the expanded tree.
fn assert_preorder<S: TreeSource>(o: &Outline<S::Item>, source: &S) {
    fn walk<S: TreeSource>(
        o: &Outline<S::Item>,
        source: &S,
        parent: Option<NodeId>,
        path: &IndexPath,
        out: &mut Vec<NodeId>,
    ) {
        let parent_item = parent.map(|id| o.node(id).unwrap().item());
        for index in 0..source.child_count(parent_item) {
            let child_path = path.child(index);
            let id = o
                .node_for_path(&child_path)
                .expect("children of expanded nodes must be present");
            let node = o.node(id).unwrap();
            assert_eq!(node.parent(), parent);
            assert_eq!(node.depth(), child_path.depth());
            out.push(id);
            if node.is_expanded() {
                walk(o, source, Some(id), &child_path, out);
            }
        }
    }

    let mut expected = Vec::new();
    walk(o, source, None, &IndexPath::new(), &mut expected);
    assert_eq!(o.outline_rows(), expected.as_slice());
}

/// Checks that the active rows are an ordered subsequence of the outline list and that every
/// visible row passes the filter or is protected.
fn assert_filtered_subsequence<T>(o: &Outline<T>) {
    let Some(predicate) = o.filter_predicate().cloned() else {
        assert_eq!(o.rows(), o.outline_rows());
        return;
    };
    let mut outline = o.outline_rows().iter();
    for id in o.rows() {
        assert!(
            outline.any(|x| x == id),
            "filtered rows must be an ordered subsequence of the outline"
        );
        let node = o.node(*id).unwrap();
        assert!(predicate(node.item()) || o.is_protected(*id));
    }
}

/// Replays `changes` against `before` the way a host list would and checks the result.
fn assert_replays(before: &[NodeId], changes: &RowChanges, after: &[NodeId]) {
    if changes.full_reload {
        return;
    }
    let mut rows = before.to_vec();
    for &position in changes.deleted.iter().rev() {
        rows.remove(position);
    }
    for &position in &changes.inserted {
        rows.insert(position, after[position]);
    }
    assert_eq!(rows, after);
}

#[test]
fn expand_and_collapse_scenario() {
    let tree = sample();
    let mut o = Outline::default();
    let changes = o.populate_roots(&tree);
    assert!(changes.full_reload);
    assert_eq!(names(&o), ["A"]);

    let a = id(&o, "A");
    let changes = o.expand(&tree, a, false).unwrap();
    assert_eq!(changes.inserted, [1, 2]);
    assert!(changes.deleted.is_empty());
    assert_eq!(names(&o), ["A", "B", "C"]);
    assert_eq!(o.row_count(), 3);

    let b = id(&o, "B");
    let changes = o.expand(&tree, b, false).unwrap();
    assert_eq!(changes.inserted, [2, 3]);
    assert_eq!(names(&o), ["A", "B", "D", "E", "C"]);
    assert_eq!(o.row_count(), 5);

    let changes = o.collapse(a, false).unwrap();
    assert_eq!(changes.deleted, [1, 2, 3, 4]);
    assert!(changes.inserted.is_empty());
    assert_eq!(names(&o), ["A"]);
    assert_eq!(o.row_count(), 1);
    assert!(!o.contains(b));
    assert!(!o.node(a).unwrap().is_expanded());
}

#[test]
fn paths_and_depths_follow_the_tree() {
    let tree = sample();
    let o = expanded_sample(&tree, OutlineOptions::new());

    let d = o.node(id(&o, "D")).unwrap();
    assert_eq!(d.path(), &IndexPath::from([0, 0, 0]));
    assert_eq!(d.depth(), 2);
    assert_eq!(d.parent(), Some(id(&o, "B")));

    let c = o.node(id(&o, "C")).unwrap();
    assert_eq!(c.path(), &IndexPath::from([0, 1]));
    assert_eq!(c.depth(), 1);

    let a = o.node(id(&o, "A")).unwrap();
    assert_eq!(a.parent(), None);
    assert_eq!(a.depth(), 0);
    assert_preorder(&o, &tree);
}

#[test]
fn toggle_fires_hooks_only_when_user_initiated() {
    let log = Arc::new(Mutex::new(Vec::<(&'static str, &'static str)>::new()));
    let hook = |event: &'static str| {
        let log = Arc::clone(&log);
        Some(move |item: &&'static str| log.lock().unwrap().push((event, *item)))
    };
    let options = OutlineOptions::<&'static str>::new()
        .with_on_will_expand(hook("will_expand"))
        .with_on_did_expand(hook("did_expand"))
        .with_on_will_collapse(hook("will_collapse"))
        .with_on_did_collapse(hook("did_collapse"));

    let mut tree = sample();
    let mut o = Outline::new(options);
    o.populate_roots(&tree);
    let a = id(&o, "A");

    o.toggle(&tree, a).unwrap();
    assert_eq!(names(&o), ["A", "B", "C"]);
    o.toggle(&tree, a).unwrap();
    assert_eq!(names(&o), ["A"]);
    assert_eq!(
        *log.lock().unwrap(),
        [
            ("will_expand", "A"),
            ("did_expand", "A"),
            ("will_collapse", "A"),
            ("did_collapse", "A"),
        ]
    );

    log.lock().unwrap().clear();
    o.expand(&tree, a, false).unwrap();
    o.collapse(a, false).unwrap();
    tree.auto_expand = Some(vec!["A", "B"]);
    o.reload(&tree);
    assert_eq!(names(&o), ["A", "B", "D", "E", "C"]);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn expanding_a_leaf_is_a_noop() {
    let tree = sample();
    let mut o = Outline::default();
    o.populate_roots(&tree);
    let a = id(&o, "A");
    o.expand(&tree, a, false).unwrap();

    let c = id(&o, "C");
    assert_eq!(o.expand(&tree, c, true), Err(OutlineError::NotExpandable));
    assert_eq!(o.toggle(&tree, c), Err(OutlineError::NotExpandable));
    assert_eq!(names(&o), ["A", "B", "C"]);
    assert!(!o.node(c).unwrap().is_expanded());
}

#[test]
fn stale_and_collapsed_nodes_are_reported() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    let a = id(&o, "A");
    let b = id(&o, "B");
    let c = id(&o, "C");

    assert_eq!(o.collapse(c, true), Err(OutlineError::NotCollapsible));

    o.collapse(a, false).unwrap();
    assert_eq!(o.toggle(&tree, b), Err(OutlineError::NodeNotFound));
    assert_eq!(o.expand(&tree, b, false), Err(OutlineError::NodeNotFound));
    assert_eq!(o.collapse(b, false), Err(OutlineError::NodeNotFound));

    // Re-expanding reuses arena slots but never revives the old ids.
    o.expand(&tree, a, false).unwrap();
    assert!(o.node(b).is_none());
    assert_ne!(id(&o, "B"), b);
}

#[test]
fn expanding_twice_changes_nothing() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    let a = id(&o, "A");
    let before = o.outline_rows().to_vec();
    let changes = o.expand(&tree, a, true).unwrap();
    assert!(changes.is_empty());
    assert_eq!(o.outline_rows(), before.as_slice());
}

#[test]
fn expand_collapse_round_trip_restores_outline() {
    let tree = Tree::new(vec![
        branch("A", vec![branch("B", vec![leaf("D"), leaf("E")]), leaf("C")]),
        branch("F", vec![leaf("G")]),
    ]);
    let mut o = Outline::default();
    o.populate_roots(&tree);
    let f = id(&o, "F");
    o.expand(&tree, f, false).unwrap();
    let before = o.outline_rows().to_vec();

    let a = id(&o, "A");
    let expand = o.expand(&tree, a, true).unwrap();
    assert_eq!(outline_names(&o), ["A", "B", "C", "F", "G"]);
    let collapse = o.collapse(a, true).unwrap();
    assert_eq!(expand.inserted, collapse.deleted);
    assert_eq!(o.outline_rows(), before.as_slice());
    assert_eq!(outline_names(&o), ["A", "F", "G"]);
}

#[test]
fn collapse_removes_exactly_the_descendants() {
    let tree = Tree::new(vec![
        branch(
            "A",
            vec![
                branch("B", vec![branch("C", vec![leaf("D")]), leaf("E")]),
                leaf("F"),
            ],
        ),
        leaf("G"),
    ]);
    let mut o = Outline::default();
    o.populate_roots(&tree);
    for name in ["A", "B", "C"] {
        let node = id(&o, name);
        o.expand(&tree, node, false).unwrap();
    }
    assert_eq!(outline_names(&o), ["A", "B", "C", "D", "E", "F", "G"]);

    let b = id(&o, "B");
    let before = o.row_count();
    let changes = o.collapse(b, true).unwrap();
    assert_eq!(changes.deleted, [2, 3, 4]);
    assert_eq!(o.row_count(), before - 3);
    assert_eq!(outline_names(&o), ["A", "B", "F", "G"]);
    assert_preorder(&o, &tree);
}

#[test]
fn auto_expand_flattens_recursively() {
    let mut tree = sample();
    tree.auto_expand = Some(vec!["B"]);
    let mut o = Outline::default();
    o.populate_roots(&tree);
    let a = id(&o, "A");

    let changes = o.expand(&tree, a, true).unwrap();
    assert_eq!(changes.inserted, [1, 2, 3, 4]);
    assert_eq!(names(&o), ["A", "B", "D", "E", "C"]);
    assert!(o.node(id(&o, "B")).unwrap().is_expanded());
    assert_preorder(&o, &tree);
}

#[test]
fn insert_appends_children_of_expanded_parents() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());

    tree.entry_mut("A").children.push(leaf("F"));
    let changes = o.insert(&tree, &[IndexPath::from([0, 2])]);
    assert_eq!(changes.inserted, [5]);
    assert_eq!(names(&o), ["A", "B", "D", "E", "C", "F"]);
    let f = o.node(id(&o, "F")).unwrap();
    assert_eq!(f.path(), &IndexPath::from([0, 2]));
    assert_eq!(f.parent(), Some(id(&o, "A")));
    assert!(!f.is_expanded());

    tree.entry_mut("B").children.push(leaf("H"));
    tree.roots.push(leaf("Z"));
    let changes = o.insert(&tree, &[IndexPath::from([1]), IndexPath::from([0, 0, 2])]);
    assert_eq!(changes.inserted, [4, 7]);
    assert_eq!(names(&o), ["A", "B", "D", "E", "H", "C", "F", "Z"]);
    assert_preorder(&o, &tree);
}

#[test]
fn insert_between_siblings_needs_the_shifted_rows_reported() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());

    // `[0, 1]` still names `C`, so the new middle child is skipped.
    tree.entry_mut("A").children.insert(1, leaf("M"));
    assert!(o.insert(&tree, &[IndexPath::from([0, 1])]).is_empty());
    assert_eq!(names(&o), ["A", "B", "D", "E", "C"]);

    let changes = o.delete(&[IndexPath::from([0, 1])]);
    assert_eq!(changes.deleted, [4]);
    let changes = o.insert(&tree, &[IndexPath::from([0, 1]), IndexPath::from([0, 2])]);
    assert_eq!(changes.inserted, [4, 5]);
    assert_eq!(names(&o), ["A", "B", "D", "E", "M", "C"]);
    assert_preorder(&o, &tree);
}

#[test]
fn insert_skips_unresolvable_paths() {
    let mut tree = sample();
    let mut o = Outline::default();
    o.populate_roots(&tree);

    // Parent collapsed.
    tree.entry_mut("A").children.push(leaf("F"));
    assert!(o.insert(&tree, &[IndexPath::from([0, 2])]).is_empty());

    let a = id(&o, "A");
    o.expand(&tree, a, false).unwrap();
    let before = o.outline_rows().to_vec();
    // Out of range, absent parent, already present, virtual root.
    let changes = o.insert(
        &tree,
        &[
            IndexPath::from([0, 9]),
            IndexPath::from([4, 0]),
            IndexPath::from([0, 0]),
            IndexPath::new(),
        ],
    );
    assert!(changes.is_empty());
    assert_eq!(o.outline_rows(), before.as_slice());
}

#[test]
fn delete_cascades_and_renumbers_siblings() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    let d = id(&o, "D");
    o.select(d);

    tree.entry_mut("A").children.remove(0);
    let changes = o.delete(&[IndexPath::from([0, 0])]);
    assert_eq!(changes.deleted, [1, 2, 3]);
    assert_eq!(names(&o), ["A", "C"]);
    assert_eq!(o.path_for_position(1), Some(&IndexPath::from([0, 0])));
    assert!(!o.is_selected(d));
    assert_eq!(o.selected().count(), 0);
    assert_preorder(&o, &tree);

    tree.entry_mut("A").children.push(leaf("G"));
    let changes = o.insert(&tree, &[IndexPath::from([0, 1])]);
    assert_eq!(changes.inserted, [2]);
    assert_eq!(names(&o), ["A", "C", "G"]);
    assert_preorder(&o, &tree);
}

#[test]
fn delete_batches_resolve_paths_before_renumbering() {
    let mut tree = Tree::new(vec![branch(
        "A",
        vec![leaf("B"), leaf("C"), leaf("X"), branch("Y", vec![leaf("Q")])],
    )]);
    let mut o = Outline::default();
    o.populate_roots(&tree);
    let a = id(&o, "A");
    o.expand(&tree, a, false).unwrap();
    let y = id(&o, "Y");
    o.expand(&tree, y, false).unwrap();
    assert_eq!(names(&o), ["A", "B", "C", "X", "Y", "Q"]);

    tree.entry_mut("A")
        .children
        .retain(|e| e.name != "C" && e.name != "X");
    let changes = o.delete(&[
        IndexPath::from([0, 2]),
        IndexPath::from([0, 1]),
        IndexPath::from([0, 7]),
    ]);
    assert_eq!(changes.deleted, [2, 3]);
    assert_eq!(names(&o), ["A", "B", "Y", "Q"]);
    assert_eq!(o.node(y).unwrap().path(), &IndexPath::from([0, 1]));
    assert_eq!(
        o.node(id(&o, "Q")).unwrap().path(),
        &IndexPath::from([0, 1, 0])
    );
    assert_preorder(&o, &tree);

    assert!(o.delete(&[IndexPath::from([5])]).is_empty());
}

#[test]
fn reload_restores_expanded_items() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new().with_maintain_expanded(true));
    let snapshot = |o: &Outline<&'static str>| -> Vec<(&'static str, bool)> {
        o.iter()
            .map(|(_, node)| (*node.item(), node.is_expanded()))
            .collect()
    };
    let before = snapshot(&o);

    let changes = o.reload(&tree);
    assert!(changes.full_reload);
    assert_eq!(snapshot(&o), before);
    assert_preorder(&o, &tree);

    // Twice in a row is still stable.
    o.reload(&tree);
    assert_eq!(snapshot(&o), before);
}

#[test]
fn reload_without_memory_collapses_everything() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.reload(&tree);
    assert_eq!(names(&o), ["A"]);
    assert!(!o.node(id(&o, "A")).unwrap().is_expanded());
}

#[test]
fn reload_prefers_source_expansion_intent() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new().with_maintain_expanded(true));
    tree.auto_expand = Some(vec!["A"]);
    o.reload(&tree);
    assert_eq!(names(&o), ["A", "B", "C"]);

    // Intent is ignored for items that cannot expand.
    tree.auto_expand = Some(vec!["A", "C"]);
    o.reload(&tree);
    assert_eq!(names(&o), ["A", "B", "C"]);
    assert!(!o.node(id(&o, "C")).unwrap().is_expanded());
}

#[test]
fn reload_carries_selection_by_item() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new().with_maintain_expanded(true));
    let d = id(&o, "D");
    o.select(d);

    o.reload(&tree);
    let new_d = id(&o, "D");
    assert_ne!(new_d, d);
    assert!(o.is_selected(new_d));
    assert_eq!(o.selected().count(), 1);
}

#[test]
fn reload_items_refetches_value_items() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    tree.entry_mut("E").name = "E2";

    let changes = o.reload_items(&tree, &[IndexPath::from([0, 0, 1]), IndexPath::from([3])]);
    assert_eq!(changes.reloaded, [3]);
    assert_eq!(names(&o), ["A", "B", "D", "E", "C"]);

    tree.identity = ItemIdentity::Refetch;
    let changes = o.reload_items(&tree, &[IndexPath::from([0, 0, 1])]);
    assert_eq!(changes.reloaded, [3]);
    assert_eq!(names(&o), ["A", "B", "D", "E2", "C"]);
}

#[test]
fn lookups_return_none_when_absent() {
    let tree = sample();
    let o = expanded_sample(&tree, OutlineOptions::new());

    assert_eq!(o.position_for_path(&IndexPath::from([0, 0, 1])), Some(3));
    assert_eq!(o.position_for_path(&IndexPath::from([0, 5])), None);
    assert_eq!(o.path_for_position(4), Some(&IndexPath::from([0, 1])));
    assert_eq!(o.path_for_position(5), None);
    assert_eq!(o.node_for_path(&IndexPath::from([0, 0])), Some(id(&o, "B")));
    assert_eq!(o.node_for_path(&IndexPath::new()), None);
    assert_eq!(o.position_of_item(&"E"), Some(3));
    assert_eq!(o.position_of_item(&"Q"), None);
    assert_eq!(o.find(|item| item.starts_with('C')), Some(id(&o, "C")));
    assert_eq!(o.find(|_| false), None);
    assert!(o.node_at(9).is_none());
    assert!(o.id_at(9).is_none());
}

#[test]
fn filter_keeps_selected_row_and_ancestors() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.select(id(&o, "D"));

    let changes = o.apply_filter(predicate(|n: &&'static str| n.starts_with('D')), true);
    assert_eq!(changes.deleted, [3, 4]);
    assert!(changes.inserted.is_empty());
    assert_eq!(names(&o), ["A", "B", "D"]);
    assert_eq!(o.row_count(), 3);
    assert_eq!(o.outline_len(), 5);
    assert_eq!(o.protected_positions(), [0, 1, 2]);
    assert!(o.is_filtered());
    assert_filtered_subsequence(&o);
}

#[test]
fn filter_without_selection_hides_failing_subtrees() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.select(id(&o, "D"));

    let changes = o.apply_filter(predicate(|n: &&'static str| n.starts_with('D')), false);
    assert_eq!(changes.deleted, [0, 1, 2, 3, 4]);
    assert_eq!(o.row_count(), 0);
    assert!(o.protected_positions().is_empty());
}

#[test]
fn exclusion_reports_protected_positions() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.select(id(&o, "D"));

    let exclusion = o.compute_excluded(&|n: &&'static str| n.starts_with('D'), true);
    assert_eq!(exclusion.excluded, [3, 4]);
    assert_eq!(exclusion.protected, [0, 1, 2]);
    // Pure: nothing is filtered yet.
    assert!(!o.is_filtered());
    assert_eq!(o.row_count(), 5);
}

#[test]
fn filter_prunes_branches_without_survivors() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());

    let changes = o.apply_filter(predicate(|n: &&'static str| *n != "D" && *n != "E"), true);
    assert_eq!(changes.deleted, [1, 2, 3]);
    assert_eq!(names(&o), ["A", "C"]);
    assert_filtered_subsequence(&o);
}

#[test]
fn filter_keeps_matching_collapsed_branches() {
    let tree = sample();
    let mut o = Outline::default();
    o.populate_roots(&tree);
    let a = id(&o, "A");
    o.expand(&tree, a, false).unwrap();

    o.apply_filter(predicate(|n: &&'static str| *n != "C"), false);
    assert_eq!(names(&o), ["A", "B"]);
}

#[test]
fn deep_selection_survives_a_filter_excluding_every_ancestor() {
    let tree = Tree::new(vec![branch(
        "R",
        vec![branch("S", vec![branch("T", vec![leaf("L")])])],
    )]);
    let mut o = Outline::default();
    o.populate_roots(&tree);
    for name in ["R", "S", "T"] {
        let node = id(&o, name);
        o.expand(&tree, node, false).unwrap();
    }
    let l = id(&o, "L");
    o.select(l);

    let changes = o.apply_filter(predicate(|_: &&'static str| false), true);
    assert!(changes.is_empty());
    assert_eq!(names(&o), ["R", "S", "T", "L"]);
    assert_eq!(o.protected_positions(), [0, 1, 2, 3]);
    assert!(o.is_protected(l));
}

#[test]
fn replacing_a_filter_deletes_then_inserts() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());

    let changes = o.apply_filter(predicate(|n: &&'static str| *n != "C"), true);
    assert_eq!(changes.deleted, [4]);
    assert_eq!(names(&o), ["A", "B", "D", "E"]);

    let before = o.rows().to_vec();
    let changes = o.apply_filter(predicate(|n: &&'static str| *n != "E"), true);
    assert_eq!(changes.deleted, [3]);
    assert_eq!(changes.inserted, [3]);
    assert!(changes.needs_grouping());
    assert_eq!(names(&o), ["A", "B", "D", "C"]);
    assert_replays(&before, &changes, o.rows());

    let before = o.rows().to_vec();
    let changes = o.apply_filter(None, true);
    assert!(changes.deleted.is_empty());
    assert_eq!(changes.inserted, [3]);
    assert_eq!(names(&o), ["A", "B", "D", "E", "C"]);
    assert!(!o.is_filtered());
    assert!(o.protected_positions().is_empty());
    assert_replays(&before, &changes, o.rows());
}

#[test]
fn mutations_while_filtered_use_filtered_coordinates() {
    let tree = sample();
    let mut o = Outline::default();
    o.populate_roots(&tree);
    let a = id(&o, "A");
    o.expand(&tree, a, false).unwrap();
    let changes = o.apply_filter(predicate(|n: &&'static str| *n != "E"), false);
    assert!(changes.is_empty());

    let b = id(&o, "B");
    let changes = o.expand(&tree, b, true).unwrap();
    assert_eq!(changes.inserted, [2]);
    assert_eq!(names(&o), ["A", "B", "D", "C"]);
    assert_eq!(outline_names(&o), ["A", "B", "D", "E", "C"]);

    let changes = o.collapse(b, true).unwrap();
    assert_eq!(changes.deleted, [2]);
    assert_eq!(names(&o), ["A", "B", "C"]);
}

#[test]
fn deleting_while_filtered_reports_filtered_rows() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.apply_filter(predicate(|n: &&'static str| *n != "E"), true);
    assert_eq!(names(&o), ["A", "B", "D", "C"]);

    // `E` is hidden, so the host sees nothing.
    tree.entry_mut("B").children.remove(1);
    let changes = o.delete(&[IndexPath::from([0, 0, 1])]);
    assert!(changes.is_empty());
    assert_eq!(outline_names(&o), ["A", "B", "D", "C"]);
    assert_preorder(&o, &tree);

    tree.entry_mut("A").children.remove(1);
    let before = o.rows().to_vec();
    let changes = o.delete(&[IndexPath::from([0, 1])]);
    assert_eq!(changes.deleted, [3]);
    assert!(changes.inserted.is_empty());
    assert_replays(&before, &changes, o.rows());
    assert_eq!(names(&o), ["A", "B", "D"]);
    assert_preorder(&o, &tree);
    assert_filtered_subsequence(&o);
}

#[test]
fn deleting_a_protected_row_hides_ancestors_it_justified() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.select(id(&o, "D"));
    o.select(id(&o, "C"));
    o.apply_filter(predicate(|_: &&'static str| false), true);
    assert_eq!(names(&o), ["A", "B", "D", "C"]);

    tree.entry_mut("B").children.remove(0);
    let before = o.rows().to_vec();
    let changes = o.delete(&[IndexPath::from([0, 0, 0])]);
    assert_eq!(changes.deleted, [1, 2]);
    assert_replays(&before, &changes, o.rows());
    assert_eq!(names(&o), ["A", "C"]);
    assert_eq!(outline_names(&o), ["A", "B", "E", "C"]);
    assert_eq!(o.protected_positions(), [0, 3]);
    assert_eq!(o.selected().count(), 1);
    assert_preorder(&o, &tree);
    assert_filtered_subsequence(&o);
}

#[test]
fn deleting_the_ancestor_of_a_protected_row_drops_the_selection() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.select(id(&o, "D"));
    o.apply_filter(predicate(|_: &&'static str| false), true);
    assert_eq!(names(&o), ["A", "B", "D"]);

    tree.entry_mut("A").children.remove(0);
    let before = o.rows().to_vec();
    let changes = o.delete(&[IndexPath::from([0, 0])]);
    assert_eq!(changes.deleted, [0, 1, 2]);
    assert_replays(&before, &changes, o.rows());
    assert_eq!(o.row_count(), 0);
    assert_eq!(outline_names(&o), ["A", "C"]);
    assert!(o.selected().next().is_none());
    assert!(o.protected_positions().is_empty());
    assert_preorder(&o, &tree);
}

#[test]
fn inserting_while_filtered_reports_filtered_rows() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.apply_filter(predicate(|n: &&'static str| *n != "E"), true);

    tree.entry_mut("B").children.push(leaf("F"));
    let before = o.rows().to_vec();
    let changes = o.insert(&tree, &[IndexPath::from([0, 0, 2])]);
    assert_eq!(changes.inserted, [3]);
    assert!(changes.deleted.is_empty());
    assert_replays(&before, &changes, o.rows());
    assert_eq!(names(&o), ["A", "B", "D", "F", "C"]);
    assert_eq!(outline_names(&o), ["A", "B", "D", "E", "F", "C"]);
    assert_preorder(&o, &tree);
    assert_filtered_subsequence(&o);
}

#[test]
fn inserting_under_a_protected_ancestor_stays_hidden() {
    let mut tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    o.select(id(&o, "D"));
    o.apply_filter(predicate(|n: &&'static str| n.starts_with('D')), true);
    assert_eq!(names(&o), ["A", "B", "D"]);

    // `A` fails the filter, so its subtree is hidden even where the predicate passes.
    tree.entry_mut("B").children.push(leaf("DD"));
    tree.entry_mut("A").children.push(leaf("G"));
    let changes = o.insert(
        &tree,
        &[IndexPath::from([0, 0, 2]), IndexPath::from([0, 2])],
    );
    assert!(changes.is_empty());
    assert_eq!(names(&o), ["A", "B", "D"]);
    assert_eq!(outline_names(&o), ["A", "B", "D", "E", "DD", "C", "G"]);
    assert_eq!(o.protected_positions(), [0, 1, 2]);
    assert_preorder(&o, &tree);
    assert_filtered_subsequence(&o);
}

#[test]
fn releasing_protection_hides_unjustified_ancestors() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    let d = id(&o, "D");
    o.select(d);
    o.apply_filter(predicate(|n: &&'static str| n.starts_with('D')), true);
    assert_eq!(names(&o), ["A", "B", "D"]);

    // Still selected: nothing to release.
    assert!(o.release_protection(d).is_empty());

    o.deselect(d);
    let changes = o.release_protection(d);
    assert_eq!(changes.deleted, [0, 1, 2]);
    assert_eq!(o.row_count(), 0);
    assert!(!o.is_protected(d));
    assert!(o.release_protection(d).is_empty());
}

#[test]
fn releasing_one_of_two_selections_keeps_shared_ancestors() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new());
    let d = id(&o, "D");
    let c = id(&o, "C");
    o.select(d);
    o.select(c);
    o.apply_filter(predicate(|_: &&'static str| false), true);
    assert_eq!(names(&o), ["A", "B", "D", "C"]);

    o.deselect(d);
    let changes = o.release_protection(d);
    assert_eq!(changes.deleted, [1, 2]);
    assert_eq!(names(&o), ["A", "C"]);
    assert_eq!(o.protected_positions(), [0, 4]);
}

#[test]
fn reload_reapplies_the_active_filter() {
    let tree = sample();
    let mut o = expanded_sample(&tree, OutlineOptions::new().with_maintain_expanded(true));
    o.select(id(&o, "D"));
    o.apply_filter(predicate(|n: &&'static str| n.starts_with('D')), true);

    let changes = o.reload(&tree);
    assert!(changes.full_reload);
    assert_eq!(names(&o), ["A", "B", "D"]);
    assert_filtered_subsequence(&o);
}

#[test]
fn index_batch_drops_duplicates() {
    let mut batch = IndexBatch::new(5);
    batch.push(1);
    batch.push(1);
    batch.push_range(3, 9);
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.finish(), [1, 3, 4]);
}

#[test]
fn index_path_prefixes() {
    let parent = IndexPath::from([0, 1]);
    let child = parent.child(3);
    assert_eq!(child.as_slice(), &[0, 1, 3]);
    assert_eq!(child.parent(), Some(parent.clone()));
    assert_eq!(child.last(), Some(3));
    assert!(parent.is_strict_prefix_of(&child));
    assert!(parent.is_prefix_of(&parent));
    assert!(!parent.is_strict_prefix_of(&parent));
    assert!(IndexPath::new().is_strict_prefix_of(&parent));
    assert_eq!(IndexPath::from([4]).parent(), Some(IndexPath::new()));
    assert_eq!(IndexPath::new().parent(), None);
}

#[test]
fn error_messages() {
    assert_eq!(
        OutlineError::NotExpandable.to_string(),
        "item is not expandable"
    );
    assert_eq!(
        OutlineError::NodeNotFound.to_string(),
        "node is not in the outline"
    );
}

/// Items are node numbers; `kids[0]` lists the roots.
struct Generated {
    kids: Vec<Vec<u32>>,
}

impl Generated {
    fn new(rng: &mut Lcg, nodes: usize) -> Self {
        let mut kids = vec![Vec::new()];
        for id in 1..=nodes {
            kids.push(Vec::new());
            let parent = rng.gen_range_usize(0, id);
            kids[parent].push(id as u32);
        }
        Self { kids }
    }
}

impl Generated {
    fn kids_of(&mut self, parent: Option<u32>) -> &mut Vec<u32> {
        &mut self.kids[parent.map_or(0, |p| p as usize)]
    }

    /// Appends a fresh leaf under `parent` and returns its sibling index.
    fn append(&mut self, parent: Option<u32>) -> usize {
        let item = self.kids.len() as u32;
        self.kids.push(Vec::new());
        let kids = self.kids_of(parent);
        kids.push(item);
        kids.len() - 1
    }
}

impl TreeSource for Generated {
    type Item = u32;

    fn child_count(&self, parent: Option<&u32>) -> usize {
        self.kids[parent.map_or(0, |&p| p as usize)].len()
    }

    fn child(&self, index: usize, parent: Option<&u32>) -> u32 {
        self.kids[parent.map_or(0, |&p| p as usize)][index]
    }

    fn is_expandable(&self, item: &u32) -> bool {
        !self.kids[*item as usize].is_empty()
    }
}

#[test]
fn random_operations_keep_projection_consistent() {
    for seed in 1..=8u64 {
        let mut rng = Lcg::new(seed);
        let mut tree = Generated::new(&mut rng, 60);
        let mut o = Outline::new(OutlineOptions::new().with_maintain_expanded(true));
        o.populate_roots(&tree);

        for _ in 0..300 {
            let before = o.rows().to_vec();
            let op = rng.gen_range_usize(0, 15);
            let changes = match op {
                0..=6 => {
                    if before.is_empty() {
                        continue;
                    }
                    let row = before[rng.gen_range_usize(0, before.len())];
                    match o.toggle(&tree, row) {
                        Ok(changes) => changes,
                        Err(err) => {
                            assert_eq!(err, OutlineError::NotExpandable);
                            assert_eq!(o.rows(), before.as_slice());
                            continue;
                        }
                    }
                }
                7 => {
                    if let Some(&row) = before.get(rng.gen_range_usize(0, before.len().max(1))) {
                        o.select(row);
                    }
                    continue;
                }
                8 => {
                    let predicate = if o.is_filtered() && rng.gen_bool() {
                        None
                    } else {
                        let m = rng.gen_range_usize(2, 5) as u32;
                        let p: FilterPredicate<u32> = Arc::new(move |id: &u32| id % m != 0);
                        Some(p)
                    };
                    o.apply_filter(predicate, rng.gen_bool())
                }
                9 => {
                    let Some(row) = o.selected().next() else {
                        continue;
                    };
                    o.deselect(row);
                    o.release_protection(row)
                }
                10 => o.reload(&tree),
                11 => {
                    let Some(&row) = o.outline_rows().get(rng.gen_range_usize(0, o.outline_len().max(1))) else {
                        continue;
                    };
                    let path = o.node(row).unwrap().path().clone();
                    o.reload_items(&tree, &[path])
                }
                12 | 13 => {
                    let Some(&row) = o.outline_rows().get(rng.gen_range_usize(0, o.outline_len().max(1))) else {
                        continue;
                    };
                    let node = o.node(row).unwrap();
                    let path = node.path().clone();
                    let parent = node.parent().map(|p| *o.node(p).unwrap().item());
                    tree.kids_of(parent).remove(path.last().unwrap());
                    o.delete(&[path])
                }
                _ => {
                    // Appends under an expanded row, or at the top level.
                    let expanded = o
                        .outline_rows()
                        .get(rng.gen_range_usize(0, o.outline_len() + 1))
                        .copied()
                        .filter(|&id| o.node(id).unwrap().is_expanded());
                    let (parent, parent_path) = match expanded {
                        Some(id) => {
                            let node = o.node(id).unwrap();
                            (Some(*node.item()), node.path().clone())
                        }
                        None => (None, IndexPath::new()),
                    };
                    let index = tree.append(parent);
                    o.insert(&tree, &[parent_path.child(index)])
                }
            };

            assert_replays(&before, &changes, o.rows());
            assert_eq!(o.arena.len(), o.outline_len());
            assert_preorder(&o, &tree);
            assert_filtered_subsequence(&o);
            for id in o.selected() {
                assert!(o.contains(id));
            }

            // A live edit must leave the same outline a full rebuild produces.
            if op >= 12 && rng.gen_bool() {
                let items = |o: &Outline<u32>| -> Vec<u32> {
                    o.outline_rows()
                        .iter()
                        .map(|&id| *o.node(id).unwrap().item())
                        .collect()
                };
                let live = items(&o);
                o.reload(&tree);
                assert_eq!(live, items(&o));
                assert_preorder(&o, &tree);
            }
        }
    }
}
