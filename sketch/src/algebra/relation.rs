use super::{Intersection, InvalidInterval};
use crate::range::Range;

/// Where `B` belongs in a tree that already holds `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `B` becomes a parent of `A`.
    Parent,
    /// `B` becomes a descendant of `A`.
    Child,
    /// `B` is a sibling somewhere before `A`.
    Previous,
    /// `B` is a sibling somewhere after `A`.
    Next,
}

impl Relation {
    /// `Ok(None)` for identical or partially overlapping ranges, which have
    /// no valid placement relative to each other.
    pub fn compute(
        i: usize,
        j: usize,
        s: usize,
        e: usize,
    ) -> Result<Option<Self>, InvalidInterval> {
        Intersection::compute(i, j, s, e).map(Intersection::relation)
    }

    pub fn between(a: &Range, b: &Range) -> Option<Self> {
        Intersection::between(a, b).relation()
    }

    pub fn inverse(self) -> Self {
        match self {
            Relation::Parent => Relation::Child,
            Relation::Child => Relation::Parent,
            Relation::Previous => Relation::Next,
            Relation::Next => Relation::Previous,
        }
    }
}
