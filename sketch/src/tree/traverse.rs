use std::collections::HashSet;
use std::fmt;

use super::{NodeId, RangeTree};
use crate::algebra::Dominance;
use crate::range::Range;

/// An entry of [`RangeTree::flat_children`]: a real child, or a stretch of
/// the parent that no child covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Node(NodeId),
    Gap(Range),
}

impl Child {
    pub fn range(&self, tree: &RangeTree) -> Range {
        match self {
            Child::Node(id) => tree.range(*id),
            Child::Gap(range) => *range,
        }
    }
}

/// Iterator over a sibling chain.
pub struct Siblings<'t> {
    tree: &'t RangeTree,
    cursor: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.cursor?;
        self.cursor = self.tree.node(current).next;
        Some(current)
    }
}

impl RangeTree {
    /// The chain starting at `id` and following `next` links.
    pub fn siblings_from(&self, id: NodeId) -> Siblings<'_> {
        Siblings {
            tree: self,
            cursor: Some(id),
        }
    }

    /// The top-level chain, starting at the root.
    pub fn top_level(&self) -> Siblings<'_> {
        Siblings {
            tree: self,
            cursor: self.root,
        }
    }

    /// Immediate children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        Siblings {
            tree: self,
            cursor: self.node(id).first_child,
        }
        .collect()
    }

    /// Immediate children of `id` with the uncovered stretches between and
    /// around them as [`Child::Gap`]s. A childless node yields one gap over
    /// its whole range; empty gaps are left out.
    pub fn flat_children(&self, id: NodeId) -> Vec<Child> {
        let range = self.range(id);
        let mut flat = Vec::new();
        let mut cursor = range.start();
        for child in self.children(id) {
            let child_range = self.range(child);
            if child_range.start() > cursor {
                flat.push(Child::Gap(Range::new(cursor, child_range.start() - cursor)));
            }
            flat.push(Child::Node(child));
            cursor = cursor.max(child_range.end());
        }
        if range.end() > cursor {
            flat.push(Child::Gap(Range::new(cursor, range.end() - cursor)));
        }
        flat
    }

    /// Parents of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut cursor = self.node(id).parent;
        while let Some(parent) = cursor {
            ancestors.push(parent);
            cursor = self.node(parent).parent;
        }
        ancestors
    }

    /// `id` and all its descendants in document order, with their depth
    /// relative to `id`.
    pub fn hierarchy(&self, id: NodeId) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, id)];
        while let Some((depth, current)) = stack.pop() {
            out.push((depth, current));
            let children = self.children(current);
            for child in children.into_iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Every node of the structure `id` belongs to: its outermost ancestor's
    /// whole sibling chain and everything below it, in document order.
    pub fn collect(&self, id: NodeId) -> Vec<NodeId> {
        let mut head = self.ancestors(id).last().copied().unwrap_or(id);
        while let Some(previous) = self.node(head).previous {
            head = previous;
        }
        self.siblings_from(head)
            .flat_map(|top| self.hierarchy(top))
            .map(|(_, node)| node)
            .collect()
    }

    /// Check the structural invariants, reporting the first violation.
    pub fn verify(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        let mut previous_top: Option<NodeId> = None;
        for top in self.top_level() {
            if self.node(top).parent.is_some() {
                return Err(format!("top-level node {} has a parent", self.range(top)));
            }
            if self.node(top).previous != previous_top {
                return Err(format!("broken previous link at {}", self.range(top)));
            }
            if let Some(previous) = previous_top {
                self.verify_order(previous, top)?;
            }
            previous_top = Some(top);
            for (_, node) in self.hierarchy(top) {
                if !seen.insert(self.range(node)) {
                    return Err(format!("range {} is claimed twice", self.range(node)));
                }
                self.verify_children(node)?;
            }
        }
        Ok(())
    }

    fn verify_children(&self, id: NodeId) -> Result<(), String> {
        let range = self.range(id);
        let mut previous: Option<NodeId> = None;
        for child in self.children(id) {
            let node = self.node(child);
            if node.parent != Some(id) {
                return Err(format!("{} does not point back to {}", node.range, range));
            }
            if node.previous != previous {
                return Err(format!("broken previous link at {}", node.range));
            }
            if Dominance::between(&range, &node.range) != Dominance::Part {
                return Err(format!("{} does not fit inside {}", node.range, range));
            }
            if let Some(previous) = previous {
                self.verify_order(previous, child)?;
            }
            previous = Some(child);
        }
        Ok(())
    }

    fn verify_order(&self, previous: NodeId, next: NodeId) -> Result<(), String> {
        let (a, b) = (self.range(previous), self.range(next));
        if Dominance::between(&a, &b) != Dominance::None || a >= b {
            return Err(format!("siblings {} and {} overlap or are out of order", a, b));
        }
        Ok(())
    }
}

impl fmt::Display for RangeTree {
    /// One line per attached node, indented by depth.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for top in self.top_level() {
            for (depth, node) in self.hierarchy(top) {
                let sketch = self.sketch(node);
                write!(f, "{}{} {}", "  ".repeat(depth), sketch.kind, self.range(node))?;
                if !sketch.name.is_empty() {
                    write!(f, " {:?}", sketch.name)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
