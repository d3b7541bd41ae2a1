use super::{NodeId, RangeTree, TreeError};
use crate::algebra::{Dominance, Intersection};
use crate::range::Range;

/// Where a candidate goes. Computed against a read-only view, applied after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// The candidate adopts the contiguous sibling run `first..=last`.
    Wrap { first: NodeId, last: NodeId },
    /// The candidate becomes the only child of `parent`.
    FirstChild { parent: NodeId },
    /// The candidate becomes the next sibling of `sibling`.
    After { sibling: NodeId },
    /// The candidate becomes the previous sibling of `sibling`.
    Before { sibling: NodeId },
}

/// How a candidate sits against the parent of the level being searched.
enum Bounds {
    Inside,
    Outside,
}

/// The tree as it will look once the candidate is popped: the candidate
/// is skipped and its children appear in its place.
struct View<'t> {
    tree: &'t RangeTree,
    hidden: NodeId,
    candidate: Range,
    weight: u32,
}

impl<'t> View<'t> {
    fn new(tree: &'t RangeTree, hidden: NodeId) -> Self {
        View {
            tree,
            hidden,
            candidate: tree.range(hidden),
            weight: tree.sketch(hidden).weight(),
        }
    }

    fn range(&self, id: NodeId) -> Range {
        self.tree.range(id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        match self.tree.node(id).parent {
            Some(parent) if parent == self.hidden => self.tree.node(self.hidden).parent,
            other => other,
        }
    }

    fn first_child(&self, id: NodeId) -> Option<NodeId> {
        match self.tree.node(id).first_child {
            Some(child) if child == self.hidden => self.substitute_forward(),
            other => other,
        }
    }

    fn next(&self, id: NodeId) -> Option<NodeId> {
        let node = self.tree.node(id);
        let next = match node.next {
            None if node.parent == Some(self.hidden) => self.tree.node(self.hidden).next,
            other => other,
        };
        match next {
            Some(next) if next == self.hidden => self.substitute_forward(),
            other => other,
        }
    }

    fn previous(&self, id: NodeId) -> Option<NodeId> {
        let node = self.tree.node(id);
        let previous = match node.previous {
            None if node.parent == Some(self.hidden) => self.tree.node(self.hidden).previous,
            other => other,
        };
        match previous {
            Some(previous) if previous == self.hidden => self.substitute_backward(),
            other => other,
        }
    }

    /// Whatever follows the hidden node's predecessor once it is popped.
    fn substitute_forward(&self) -> Option<NodeId> {
        let hidden = self.tree.node(self.hidden);
        hidden.first_child.or(hidden.next)
    }

    /// Whatever precedes the hidden node's successor once it is popped.
    fn substitute_backward(&self) -> Option<NodeId> {
        self.tree
            .children(self.hidden)
            .last()
            .copied()
            .or(self.tree.node(self.hidden).previous)
    }

    /// Head of the top-level chain once the hidden node is popped.
    fn head(&self) -> Option<NodeId> {
        match self.tree.root {
            Some(head) if head == self.hidden => self.substitute_forward(),
            other => other,
        }
    }

    /// Refuse an empty candidate that repeats an attached empty node at the
    /// same offset, wherever in the tree that node sits.
    fn duplicate(&self) -> Result<(), TreeError> {
        if !self.candidate.is_empty() {
            return Ok(());
        }
        let offset = self.candidate.start();
        let mut pending: Vec<NodeId> = self.tree.top_level().collect();
        while let Some(id) = pending.pop() {
            let range = self.range(id);
            if id == self.hidden || offset < range.start() || range.end() < offset {
                continue;
            }
            if range.is_empty() {
                return Err(self.takeover(id));
            }
            pending.extend(self.tree.children(id));
        }
        Ok(())
    }

    fn takeover(&self, occupant: NodeId) -> TreeError {
        TreeError::Takeover {
            occupant,
            range: self.candidate,
            occupant_weight: self.tree.sketch(occupant).weight(),
            candidate_weight: self.weight,
        }
    }

    fn clash(&self, occupant: NodeId) -> TreeError {
        TreeError::Clash {
            occupant: self.range(occupant),
            candidate: self.candidate,
        }
    }

    /// Whether the candidate ends at or before `id` starts.
    fn lies_before(&self, id: NodeId) -> bool {
        matches!(
            Intersection::between(&self.range(id), &self.candidate),
            Intersection::Previous | Intersection::Before
        )
    }

    /// Whether the candidate starts at or after `id` ends.
    fn lies_after(&self, id: NodeId) -> bool {
        matches!(
            Intersection::between(&self.range(id), &self.candidate),
            Intersection::Next | Intersection::After
        )
    }

    /// Check the candidate against the parent of the level being searched.
    fn bounds(&self, parent: NodeId) -> Result<Bounds, TreeError> {
        match Dominance::between(&self.range(parent), &self.candidate) {
            Dominance::Part => Ok(Bounds::Inside),
            Dominance::Contain | Dominance::None => Ok(Bounds::Outside),
            Dominance::Exact => Err(self.takeover(parent)),
            Dominance::Share => Err(self.clash(parent)),
        }
    }

    /// Find the slot for the candidate, starting the search at `anchor`.
    ///
    /// The search only ever moves towards the candidate: sideways along a
    /// level, down into a node that encloses it, or up when it leaves the
    /// current parent. Once it descends into a node it never climbs past
    /// that node again, so it terminates.
    fn place(&self, anchor: NodeId) -> Result<Placement, TreeError> {
        let mut anchor = anchor;
        loop {
            match Intersection::between(&self.range(anchor), &self.candidate) {
                Intersection::Same => return Err(self.takeover(anchor)),
                Intersection::Overflow | Intersection::Underflow => {
                    return Err(self.clash(anchor));
                }
                Intersection::Container | Intersection::Ahead | Intersection::Behind => {
                    if let Some(parent) = self.parent(anchor) {
                        if let Bounds::Outside = self.bounds(parent)? {
                            anchor = parent;
                            continue;
                        }
                    }
                    return self.wrap(anchor);
                }
                Intersection::Fragment | Intersection::Start | Intersection::End => {
                    match self.first_child(anchor) {
                        Some(child) => anchor = child,
                        None => return Ok(Placement::FirstChild { parent: anchor }),
                    }
                }
                Intersection::Next | Intersection::After => match self.next(anchor) {
                    Some(next) if !self.lies_before(next) => anchor = next,
                    _ => {
                        if let Some(parent) = self.parent(anchor) {
                            if let Bounds::Outside = self.bounds(parent)? {
                                anchor = parent;
                                continue;
                            }
                        }
                        return Ok(Placement::After { sibling: anchor });
                    }
                },
                Intersection::Previous | Intersection::Before => match self.previous(anchor) {
                    Some(previous) if !self.lies_after(previous) => anchor = previous,
                    _ => {
                        if let Some(parent) = self.parent(anchor) {
                            if let Bounds::Outside = self.bounds(parent)? {
                                anchor = parent;
                                continue;
                            }
                        }
                        return Ok(Placement::Before { sibling: anchor });
                    }
                },
            }
        }
    }

    /// Collect the run of siblings around `anchor` that the candidate encloses.
    fn wrap(&self, anchor: NodeId) -> Result<Placement, TreeError> {
        let mut first = anchor;
        while let Some(previous) = self.previous(first) {
            match self.enclosed(previous)? {
                true => first = previous,
                false => break,
            }
        }
        let mut last = anchor;
        while let Some(next) = self.next(last) {
            match self.enclosed(next)? {
                true => last = next,
                false => break,
            }
        }
        Ok(Placement::Wrap { first, last })
    }

    /// Whether a sibling of the wrapped run joins it: enclosed siblings do,
    /// disjoint ones end the walk, anything else is a conflict.
    fn enclosed(&self, sibling: NodeId) -> Result<bool, TreeError> {
        match Dominance::between(&self.range(sibling), &self.candidate) {
            Dominance::Contain => Ok(true),
            Dominance::None => Ok(false),
            Dominance::Exact => Err(self.takeover(sibling)),
            Dominance::Share | Dominance::Part => Err(self.clash(sibling)),
        }
    }
}

impl RangeTree {
    /// Insert `candidate` into the tree, starting the search at `anchor`.
    ///
    /// The candidate is detached first (its own children stay where it was),
    /// so inserting an already placed node relocates it. On error the tree
    /// is exactly as it was before the call.
    ///
    /// Empty candidates ignore `anchor` beyond checking it is attached, so
    /// their placement never depends on where the search starts. An anchor
    /// equal to the candidate behaves like the root.
    pub fn insert(&mut self, anchor: NodeId, candidate: NodeId) -> Result<(), TreeError> {
        let range = self.range(candidate);
        let fits = range
            .checked_end()
            .is_some_and(|end| end <= self.document().len());
        if !fits || !self.is_attached(anchor) {
            let error = TreeError::OutOfBounds {
                anchor: self.range(anchor),
                candidate: range,
            };
            tracing::debug!(candidate = %range, %error, "insert rejected");
            return Err(error);
        }

        let view = View::new(self, candidate);
        // An empty range on the bound two touching siblings share lies inside
        // both; searching from the head settles it in the earlier one.
        let start = match anchor == candidate || range.is_empty() {
            true => view.head(),
            false => Some(anchor),
        };
        let Some(start) = start else {
            // The candidate is the only attached node.
            return Ok(());
        };

        let placement = match view.duplicate().and_then(|()| view.place(start)) {
            Ok(placement) => placement,
            Err(error) => {
                if let TreeError::Takeover {
                    occupant_weight,
                    candidate_weight,
                    ..
                } = &error
                {
                    if candidate_weight != occupant_weight {
                        tracing::debug!(
                            candidate = %range,
                            occupant_weight,
                            candidate_weight,
                            "weights differ on an exact duplicate; insert does not override"
                        );
                    }
                }
                tracing::debug!(candidate = %range, %error, "insert rejected");
                return Err(error);
            }
        };

        self.pop(candidate);
        self.apply(candidate, placement);
        tracing::trace!(candidate = %range, ?placement, "inserted");
        Ok(())
    }

    /// Insert `candidate`, letting a heavier candidate displace an occupant
    /// with the exact same range.
    ///
    /// Plain [`insert`](Self::insert) always refuses exact duplicates; this
    /// is the only path on which weight decides. Returns the displaced
    /// occupant, now detached, when a replacement happened.
    pub fn claim(
        &mut self,
        anchor: NodeId,
        candidate: NodeId,
    ) -> Result<Option<NodeId>, TreeError> {
        match self.insert(anchor, candidate) {
            Ok(()) => Ok(None),
            Err(TreeError::Takeover { occupant, .. })
                if occupant != candidate
                    && self.sketch(candidate).overrides(self.sketch(occupant)) =>
            {
                self.replace(occupant, candidate);
                tracing::debug!(
                    range = %self.range(candidate),
                    "heavier candidate took over an exact duplicate"
                );
                Ok(Some(occupant))
            }
            Err(error) => Err(error),
        }
    }

    /// Link the detached `candidate` according to `placement`.
    fn apply(&mut self, candidate: NodeId, placement: Placement) {
        match placement {
            Placement::FirstChild { parent } => {
                self.node_mut(parent).first_child = Some(candidate);
                self.node_mut(candidate).parent = Some(parent);
            }
            Placement::After { sibling } => {
                let parent = self.node(sibling).parent;
                let next = self.node(sibling).next;
                {
                    let node = self.node_mut(candidate);
                    node.parent = parent;
                    node.previous = Some(sibling);
                    node.next = next;
                }
                self.node_mut(sibling).next = Some(candidate);
                if let Some(next) = next {
                    self.node_mut(next).previous = Some(candidate);
                }
            }
            Placement::Before { sibling } => {
                let parent = self.node(sibling).parent;
                let previous = self.node(sibling).previous;
                {
                    let node = self.node_mut(candidate);
                    node.parent = parent;
                    node.previous = previous;
                    node.next = Some(sibling);
                }
                self.node_mut(sibling).previous = Some(candidate);
                match previous {
                    Some(previous) => self.node_mut(previous).next = Some(candidate),
                    None => self.replace_head(sibling, parent, Some(candidate)),
                }
            }
            Placement::Wrap { first, last } => {
                let parent = self.node(first).parent;
                let previous = self.node(first).previous;
                let next = self.node(last).next;
                {
                    let node = self.node_mut(candidate);
                    node.parent = parent;
                    node.previous = previous;
                    node.next = next;
                    node.first_child = Some(first);
                }
                match previous {
                    Some(previous) => self.node_mut(previous).next = Some(candidate),
                    None => self.replace_head(first, parent, Some(candidate)),
                }
                if let Some(next) = next {
                    self.node_mut(next).previous = Some(candidate);
                }
                self.node_mut(first).previous = None;
                self.node_mut(last).next = None;

                let mut cursor = Some(first);
                while let Some(id) = cursor {
                    self.node_mut(id).parent = Some(candidate);
                    cursor = self.node(id).next;
                }
            }
        }
    }
}
