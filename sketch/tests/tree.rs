//! Range tree insertion, relocation and traversal.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use proptest::sample::Index;

use sketch::algebra::Dominance;
use sketch::document::Document;
use sketch::range::Range;
use sketch::tree::{Child, NodeId, RangeTree, Sketch, TreeError};

fn tree(len: usize) -> RangeTree {
    let document = Document::new(0, "doc", "x".repeat(len));
    RangeTree::new(document, Sketch::new("document", "doc"))
}

fn r(start: usize, end: usize) -> Range {
    Range::between(start, end).expect("well-formed range")
}

fn root(tree: &RangeTree) -> NodeId {
    tree.root().expect("tree has a root")
}

fn add(tree: &mut RangeTree, start: usize, end: usize) -> NodeId {
    let node = tree.create(r(start, end), Sketch::new("node", ""));
    let anchor = root(tree);
    tree.insert(anchor, node).expect("insert failed");
    node
}

/// Insert a fresh node and check that a refusal leaves the tree untouched.
fn refuse(tree: &mut RangeTree, start: usize, end: usize) -> TreeError {
    let node = tree.create(r(start, end), Sketch::new("node", ""));
    let before = tree.clone();
    let anchor = root(tree);
    let error = tree.insert(anchor, node).unwrap_err();
    assert_eq!(*tree, before);
    assert!(!tree.is_attached(node));
    error
}

fn ranges(tree: &RangeTree, ids: Vec<NodeId>) -> Vec<Range> {
    ids.into_iter().map(|id| tree.range(id)).collect()
}

#[test]
fn new_tree_spans_the_document() {
    let tree = tree(100);
    assert_eq!(tree.range(root(&tree)), r(0, 100));
    assert_eq!(tree.len(), 1);
    assert!(tree.verify().is_ok());
}

#[test]
fn nested_insert_becomes_a_child() {
    let mut tree = tree(100);
    let outer = add(&mut tree, 10, 20);
    let inner = add(&mut tree, 12, 15);
    assert_eq!(tree.node(inner).parent(), Some(outer));
    assert_eq!(tree.node(outer).parent(), Some(root(&tree)));
    assert_eq!(tree.ancestors(inner), vec![outer, root(&tree)]);
    assert!(tree.verify().is_ok());
}

#[test]
fn siblings_stay_ordered() {
    let mut tree = tree(100);
    add(&mut tree, 50, 60);
    add(&mut tree, 10, 20);
    add(&mut tree, 30, 40);
    add(&mut tree, 20, 30);
    let root = root(&tree);
    assert_eq!(
        ranges(&tree, tree.children(root)),
        vec![r(10, 20), r(20, 30), r(30, 40), r(50, 60)]
    );
    assert!(tree.verify().is_ok());
}

#[test]
fn two_children_under_a_ten_wide_root() {
    let mut tree = tree(10);
    let left = add(&mut tree, 2, 5);
    let right = add(&mut tree, 6, 8);
    let root = root(&tree);
    assert_eq!(tree.children(root), vec![left, right]);
    assert!(tree.children(left).is_empty());
    assert!(tree.children(right).is_empty());
}

#[test]
fn covering_insert_becomes_the_common_parent() {
    let mut tree = tree(10);
    let left = add(&mut tree, 2, 5);
    let right = add(&mut tree, 6, 8);
    let parent = add(&mut tree, 2, 8);
    let root = root(&tree);
    assert_eq!(tree.children(root), vec![parent]);
    assert_eq!(tree.children(parent), vec![left, right]);
    assert!(tree.verify().is_ok());
}

#[test]
fn enclosing_insert_adopts_siblings() {
    let mut tree = tree(100);
    let a = add(&mut tree, 10, 20);
    let b = add(&mut tree, 30, 40);
    let c = add(&mut tree, 50, 60);
    let wrapper = add(&mut tree, 25, 45);

    let root = root(&tree);
    assert_eq!(tree.children(root), vec![a, wrapper, c]);
    assert_eq!(tree.children(wrapper), vec![b]);
    assert_eq!(tree.node(b).parent(), Some(wrapper));

    let outer = add(&mut tree, 5, 65);
    assert_eq!(tree.children(root), vec![outer]);
    assert_eq!(tree.children(outer), vec![a, wrapper, c]);
    assert!(tree.verify().is_ok());
}

#[test]
fn partial_overlap_is_a_clash() {
    let mut tree = tree(100);
    add(&mut tree, 10, 20);
    add(&mut tree, 30, 40);
    let error = refuse(&mut tree, 15, 25);
    assert!(matches!(error, TreeError::Clash { occupant, .. } if occupant == r(10, 20)));

    // Encloses the first sibling but cuts through the second.
    let error = refuse(&mut tree, 5, 35);
    assert!(matches!(error, TreeError::Clash { occupant, .. } if occupant == r(30, 40)));
}

#[test]
fn exact_duplicate_is_a_takeover() {
    let mut tree = tree(100);
    let first = add(&mut tree, 10, 20);
    let error = refuse(&mut tree, 10, 20);
    assert!(matches!(error, TreeError::Takeover { occupant, .. } if occupant == first));
    assert_eq!(error.candidate(), r(10, 20));
    assert_eq!(error.occupant(), Some(r(10, 20)));

    let error = refuse(&mut tree, 0, 100);
    assert!(matches!(error, TreeError::Takeover { .. }));
}

#[test]
fn out_of_bounds() {
    let mut tree = tree(100);
    let node = tree.create(r(90, 110), Sketch::new("node", ""));
    let anchor = root(&tree);
    assert!(matches!(
        tree.insert(anchor, node),
        Err(TreeError::OutOfBounds { .. })
    ));

    // A detached anchor cannot lead anywhere.
    let detached = tree.create(r(10, 20), Sketch::new("node", ""));
    let candidate = tree.create(r(12, 14), Sketch::new("node", ""));
    let before = tree.clone();
    assert!(matches!(
        tree.insert(detached, candidate),
        Err(TreeError::OutOfBounds { .. })
    ));
    assert_eq!(tree, before);
}

#[test]
fn empty_ranges_nest_inside_on_bounds() {
    let mut tree = tree(100);
    let a = add(&mut tree, 10, 20);
    let at_end = add(&mut tree, 20, 20);
    let at_start = add(&mut tree, 10, 10);
    assert_eq!(tree.children(a), vec![at_start, at_end]);
    assert!(tree.verify().is_ok());
}

#[test]
fn search_can_start_from_any_attached_node() {
    let mut tree = tree(100);
    let a = add(&mut tree, 10, 20);
    let deep = add(&mut tree, 12, 14);
    let b = add(&mut tree, 60, 80);

    let late = tree.create(r(65, 70), Sketch::new("node", ""));
    tree.insert(deep, late).expect("insert from a deep anchor");
    assert_eq!(tree.node(late).parent(), Some(b));

    let early = tree.create(r(2, 5), Sketch::new("node", ""));
    tree.insert(late, early).expect("insert backwards");
    let root = root(&tree);
    assert_eq!(tree.children(root), vec![early, a, b]);

    let wrapper = tree.create(r(11, 15), Sketch::new("node", ""));
    tree.insert(b, wrapper).expect("wrap from a sibling anchor");
    assert_eq!(tree.children(a), vec![wrapper]);
    assert_eq!(tree.children(wrapper), vec![deep]);
    assert!(tree.verify().is_ok());
}

#[test]
fn reinserting_an_attached_node_keeps_the_structure() {
    let mut tree = tree(100);
    let outer = add(&mut tree, 10, 20);
    let inner = add(&mut tree, 12, 15);
    let anchor = root(&tree);
    tree.insert(anchor, outer).expect("relocation");
    assert_eq!(tree.children(outer), vec![inner]);
    assert_eq!(tree.node(outer).parent(), Some(anchor));
    assert!(tree.verify().is_ok());
}

#[test]
fn pop_lifts_children_into_the_slot() {
    let mut tree = tree(100);
    let first = add(&mut tree, 2, 5);
    let middle = add(&mut tree, 10, 20);
    let a = add(&mut tree, 12, 14);
    let b = add(&mut tree, 15, 18);
    let last = add(&mut tree, 30, 40);

    tree.pop(middle);
    let root = root(&tree);
    assert_eq!(tree.children(root), vec![first, a, b, last]);
    assert_eq!(tree.node(a).parent(), Some(root));
    assert!(!tree.is_attached(middle));
    assert!(tree.children(middle).is_empty());
    assert!(tree.verify().is_ok());
}

#[test]
fn remove_cuts_the_whole_subtree() {
    let mut tree = tree(100);
    let subtree = add(&mut tree, 10, 20);
    let child = add(&mut tree, 12, 14);
    let sibling = add(&mut tree, 30, 40);

    tree.remove(subtree);
    let root = root(&tree);
    assert_eq!(tree.children(root), vec![sibling]);
    assert!(!tree.is_attached(subtree));
    assert!(!tree.is_attached(child));
    assert_eq!(tree.children(subtree), vec![child]);
    assert!(tree.verify().is_ok());

    // Popping the cut subtree releases its children as a free chain.
    tree.pop(subtree);
    assert!(tree.node(child).parent().is_none());
    assert!(!tree.is_attached(child));
}

#[test]
fn flat_children_fill_the_gaps() {
    let mut tree = tree(100);
    let a = add(&mut tree, 10, 20);
    let b = add(&mut tree, 20, 30);
    let c = add(&mut tree, 50, 100);
    let root = root(&tree);
    assert_eq!(
        tree.flat_children(root),
        vec![
            Child::Gap(r(0, 10)),
            Child::Node(a),
            Child::Node(b),
            Child::Gap(r(30, 50)),
            Child::Node(c),
        ]
    );
    assert_eq!(tree.flat_children(a), vec![Child::Gap(r(10, 20))]);
}

#[test]
fn hierarchy_and_collect_walk_in_document_order() {
    let mut tree = tree(100);
    let a = add(&mut tree, 10, 20);
    let inner = add(&mut tree, 12, 14);
    let b = add(&mut tree, 30, 40);
    let root = root(&tree);
    assert_eq!(
        tree.hierarchy(root),
        vec![(0, root), (1, a), (2, inner), (1, b)]
    );
    assert_eq!(tree.collect(inner), vec![root, a, inner, b]);
}

#[test]
fn display_indents_by_depth() {
    let mut tree = tree(30);
    add(&mut tree, 10, 20);
    assert_eq!(tree.to_string(), "document [0,30) \"doc\"\n  node [10,20)\n");
}

#[test]
fn heavier_claim_replaces_an_exact_duplicate() {
    let mut tree = tree(100);
    let light = tree.create(r(10, 20), Sketch::new("paragraph", "").with_weight(1));
    let anchor = root(&tree);
    assert_eq!(tree.claim(anchor, light), Ok(None));
    let child = add(&mut tree, 12, 14);

    let heavy = tree.create(r(10, 20), Sketch::new("code", "").with_weight(2));
    assert_eq!(tree.claim(anchor, heavy), Ok(Some(light)));
    assert!(!tree.is_attached(light));
    assert_eq!(tree.children(heavy), vec![child]);
    assert_eq!(tree.node(child).parent(), Some(heavy));
    assert!(tree.verify().is_ok());

    // Equal and lighter weights never displace the occupant.
    let equal = tree.create(r(10, 20), Sketch::new("code", "").with_weight(2));
    let before = tree.clone();
    assert!(matches!(
        tree.claim(anchor, equal),
        Err(TreeError::Takeover { occupant_weight: 2, candidate_weight: 2, .. })
    ));
    assert_eq!(tree, before);
}

#[test]
fn insert_ignores_weights() {
    let mut tree = tree(100);
    add(&mut tree, 10, 20);
    let heavy = tree.create(r(10, 20), Sketch::new("code", "").with_weight(9));
    let anchor = root(&tree);
    assert!(matches!(
        tree.insert(anchor, heavy),
        Err(TreeError::Takeover { candidate_weight: 9, occupant_weight: 0, .. })
    ));
}

#[test]
fn empty_range_is_unique_across_touching_siblings() {
    let mut tree = tree(100);
    let empty = add(&mut tree, 10, 10);
    let later = add(&mut tree, 10, 11);
    let earlier = add(&mut tree, 5, 10);
    assert_eq!(tree.children(later), vec![empty]);
    assert!(tree.children(earlier).is_empty());

    let error = refuse(&mut tree, 10, 10);
    assert!(matches!(error, TreeError::Takeover { occupant, .. } if occupant == empty));
    assert!(tree.verify().is_ok());
}

#[test]
fn node_used_as_its_own_anchor() {
    let mut tree = tree(100);
    let outer = add(&mut tree, 10, 20);
    let inner = add(&mut tree, 12, 15);
    add(&mut tree, 30, 40);
    let before = tree.clone();

    assert_eq!(tree.insert(outer, outer), Ok(()));
    assert_eq!(tree.insert(inner, inner), Ok(()));
    let root = root(&tree);
    assert_eq!(tree.insert(root, root), Ok(()));
    assert_eq!(tree, before);
}

#[test]
fn lone_root_used_as_its_own_anchor() {
    let mut tree = tree(10);
    let root = root(&tree);
    let before = tree.clone();
    assert_eq!(tree.insert(root, root), Ok(()));
    assert_eq!(tree, before);
}

#[test]
fn range_ending_past_usize_is_out_of_bounds() {
    let mut tree = tree(100);
    let node = tree.create(Range::new(usize::MAX, 1), Sketch::new("node", ""));
    let anchor = root(&tree);
    let error = tree.insert(anchor, node).unwrap_err();
    assert!(matches!(error, TreeError::OutOfBounds { .. }));
    assert_eq!(Range::new(usize::MAX, 1).checked_end(), None);
    assert_eq!(Range::new(usize::MAX, 1).end(), usize::MAX);
    assert!(!error.to_string().is_empty());
}

fn attached(tree: &RangeTree) -> Vec<NodeId> {
    tree.collect(root(tree))
}

/// Whether `range` can join the tree: it fits the document and neither
/// overlaps nor repeats any of `nodes`.
fn acceptable(tree: &RangeTree, nodes: &[NodeId], range: Range) -> bool {
    range.end() <= tree.document().len()
        && nodes.iter().all(|&node| {
            !matches!(
                Dominance::between(&tree.range(node), &range),
                Dominance::Share | Dominance::Exact
            )
        })
}

proptest! {
    #[test]
    fn insert_accepts_exactly_the_conflict_free_ranges(
        steps in prop::collection::vec((0usize..70, 0usize..12, any::<Index>()), 1..40),
    ) {
        let mut tree = tree(64);
        for (start, length, pick) in steps {
            let range = Range::new(start, length);
            let nodes = attached(&tree);
            let anchor = *pick.get(&nodes);
            let expected = acceptable(&tree, &nodes, range);
            let node = tree.create(range, Sketch::new("node", ""));
            let before = tree.clone();
            let result = tree.insert(anchor, node);
            prop_assert_eq!(result.is_ok(), expected, "{} from {}", range, tree.range(anchor));
            match result {
                Ok(()) => prop_assert!(tree.is_attached(node)),
                Err(_) => prop_assert_eq!(&tree, &before),
            }
            prop_assert_eq!(tree.verify(), Ok(()));
        }
    }

    #[test]
    fn relocation_keeps_the_attached_set(
        ranges in prop::collection::vec((0usize..60, 0usize..12), 1..30),
        moves in prop::collection::vec((any::<Index>(), any::<Index>()), 1..20),
    ) {
        let mut tree = tree(64);
        for (start, length) in ranges {
            let node = tree.create(Range::new(start, length), Sketch::new("node", ""));
            let anchor = root(&tree);
            let _ = tree.insert(anchor, node);
        }
        for (which, from) in moves {
            let mut nodes = attached(&tree);
            let node = *which.get(&nodes);
            let anchor = *from.get(&nodes);
            prop_assert_eq!(tree.insert(anchor, node), Ok(()));
            prop_assert_eq!(tree.verify(), Ok(()));

            let mut after = attached(&tree);
            nodes.sort();
            after.sort();
            prop_assert_eq!(after, nodes);
        }
    }

    #[test]
    fn claims_displace_only_lighter_duplicates(
        steps in prop::collection::vec((0usize..60, 0usize..6, 0u32..4, any::<Index>()), 1..40),
    ) {
        let document = Document::new(0, "doc", "x".repeat(64));
        let root_sketch = Sketch::new("document", "doc").with_weight(u32::MAX);
        let mut tree = RangeTree::new(document, root_sketch);
        for (start, length, weight, pick) in steps {
            let range = Range::new(start, length);
            let nodes = attached(&tree);
            let anchor = *pick.get(&nodes);
            let occupant = nodes.iter().copied().find(|&node| tree.range(node) == range);
            let node = tree.create(range, Sketch::new("node", "").with_weight(weight));
            let before = tree.clone();
            match tree.claim(anchor, node) {
                Ok(None) => {
                    prop_assert!(occupant.is_none());
                    prop_assert!(tree.is_attached(node));
                }
                Ok(Some(displaced)) => {
                    prop_assert_eq!(Some(displaced), occupant);
                    prop_assert!(tree.sketch(displaced).weight() < weight);
                    prop_assert!(!tree.is_attached(displaced));
                    prop_assert!(tree.is_attached(node));
                }
                Err(_) => {
                    prop_assert_eq!(&tree, &before);
                    if let Some(occupant) = occupant {
                        prop_assert!(tree.sketch(occupant).weight() >= weight);
                    }
                }
            }
            prop_assert_eq!(tree.verify(), Ok(()));
        }
    }
}
