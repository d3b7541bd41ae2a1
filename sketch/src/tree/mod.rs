//! Range tree: a strict hierarchy of non-overlapping, properly nested ranges.
//!
//! Nodes live in an arena owned by [`RangeTree`] and are addressed by
//! [`NodeId`]. Every node stores all four structural links explicitly
//! (`parent`, `first_child`, `previous`, `next`), so any node can reach its
//! parent without walking back to the head of its sibling chain.
//!
//! The structure keeps three invariants after every operation:
//!
//! - a child's range lies inside its parent's range and is never equal to it;
//! - siblings are pairwise disjoint and ordered by position;
//! - no two attached nodes claim the same range.
//!
//! Ranges enter the tree through [`RangeTree::insert`] (see `insert.rs`),
//! which derives the placement from the interval algebra and either applies
//! it completely or rejects the candidate without touching the structure.
//!
//! A tree is not synchronized. Concurrent readers are fine while nobody
//! mutates it; mutation needs exclusive access, which `&mut self` enforces.

mod error;
mod insert;
mod traverse;

pub use error::TreeError;
pub use traverse::Child;

use crate::document::Document;
use crate::range::Range;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload attached to a node: what the range was recognized as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    pub kind: String,
    pub name: String,
    /// Priority used to settle two candidates with identical bounds.
    pub weight: Option<u32>,
}

impl Sketch {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Sketch {
            kind: kind.into(),
            name: name.into(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Effective weight; an unweighted sketch weighs nothing.
    pub fn weight(&self) -> u32 {
        self.weight.unwrap_or(0)
    }

    /// Whether `self` wins a tie against `occupant` for the same range.
    pub fn overrides(&self, occupant: &Sketch) -> bool {
        self.weight() > occupant.weight()
    }
}

/// A node of the tree: a range, its payload and its links.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    range: Range,
    sketch: Sketch,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

impl Node {
    fn detached(range: Range, sketch: Sketch) -> Self {
        Node {
            range,
            sketch,
            parent: None,
            first_child: None,
            previous: None,
            next: None,
        }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn sketch(&self) -> &Sketch {
        &self.sketch
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn previous_sibling(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next
    }
}

/// Arena-backed hierarchy of ranges over one document.
///
/// `NodeId`s are only meaningful for the tree that created them; passing an
/// id from another tree indexes the wrong node or panics.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTree {
    document: Document,
    nodes: Vec<Node>,
    /// Head of the top-level sibling chain.
    root: Option<NodeId>,
}

impl RangeTree {
    /// Create a tree whose root spans the whole document.
    pub fn new(document: Document, sketch: Sketch) -> Self {
        let extent = document.extent();
        let mut tree = RangeTree {
            document,
            nodes: Vec::new(),
            root: None,
        };
        let root = tree.create(extent, sketch);
        tree.root = Some(root);
        tree
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node. It joins the structure through `insert`.
    pub fn create(&mut self, range: Range, sketch: Sketch) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::detached(range, sketch));
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn range(&self, id: NodeId) -> Range {
        self.node(id).range
    }

    pub fn sketch(&self, id: NodeId) -> &Sketch {
        &self.node(id).sketch
    }

    /// Source text covered by a node.
    pub fn text(&self, id: NodeId) -> &str {
        self.document.slice(self.range(id))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Whether `id` is reachable from the root chain.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut top = id;
        while let Some(parent) = self.node(top).parent {
            top = parent;
        }
        while let Some(previous) = self.node(top).previous {
            top = previous;
        }
        self.root == Some(top)
    }

    /// Unlink `id` and put its children in its place, in order.
    ///
    /// The rest of the structure stays connected; `id` ends up detached and
    /// childless. Popping a detached node that still holds a removed subtree
    /// releases that subtree as a free chain.
    pub fn pop(&mut self, id: NodeId) {
        let Node {
            parent,
            previous,
            next,
            ..
        } = self.node(id).clone();
        let children = self.children(id);

        let (first, last) = match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => (Some(first), Some(last)),
            _ => (None, None),
        };
        for &child in &children {
            self.node_mut(child).parent = parent;
        }

        // The vacated slot is filled by the children, or closed up.
        let head = first.or(next);
        let tail = last.or(previous);
        if let Some(first) = first {
            self.node_mut(first).previous = previous;
        }
        if let Some(last) = last {
            self.node_mut(last).next = next;
        }
        match previous {
            Some(previous) => self.node_mut(previous).next = head,
            None => self.replace_head(id, parent, head),
        }
        if let Some(next) = next {
            self.node_mut(next).previous = tail;
        }

        let node = self.node_mut(id);
        node.parent = None;
        node.previous = None;
        node.next = None;
        node.first_child = None;
        tracing::trace!(range = %node.range, "popped node");
    }

    /// Cut `id` and its whole subtree out of the structure.
    ///
    /// Nothing is reattached: the neighbours close up over the gap and the
    /// subtree stays hanging off `id`.
    pub fn remove(&mut self, id: NodeId) {
        let Node {
            parent,
            previous,
            next,
            ..
        } = self.node(id).clone();
        match previous {
            Some(previous) => self.node_mut(previous).next = next,
            None => self.replace_head(id, parent, next),
        }
        if let Some(next) = next {
            self.node_mut(next).previous = previous;
        }
        let node = self.node_mut(id);
        node.parent = None;
        node.previous = None;
        node.next = None;
        tracing::trace!(range = %node.range, "removed subtree");
    }

    /// `id` was the head of its chain; make `head` the new one.
    fn replace_head(&mut self, id: NodeId, parent: Option<NodeId>, head: Option<NodeId>) {
        match parent {
            Some(parent) => self.node_mut(parent).first_child = head,
            None if self.root == Some(id) => self.root = head,
            None => {}
        }
    }

    /// Put `candidate` into `occupant`'s slot, moving the occupant's
    /// children under it. The occupant ends up detached and childless.
    fn replace(&mut self, occupant: NodeId, candidate: NodeId) {
        self.pop(candidate);
        let Node {
            parent,
            previous,
            next,
            first_child,
            ..
        } = self.node(occupant).clone();
        let children = self.children(occupant);

        {
            let node = self.node_mut(candidate);
            node.parent = parent;
            node.previous = previous;
            node.next = next;
            node.first_child = first_child;
        }
        match previous {
            Some(previous) => self.node_mut(previous).next = Some(candidate),
            None => self.replace_head(occupant, parent, Some(candidate)),
        }
        if let Some(next) = next {
            self.node_mut(next).previous = Some(candidate);
        }
        for child in children {
            self.node_mut(child).parent = Some(candidate);
        }

        let node = self.node_mut(occupant);
        node.parent = None;
        node.previous = None;
        node.next = None;
        node.first_child = None;
    }
}
