use std::fmt;

use super::{Dominance, InvalidInterval, Relation, validate};
use crate::range::Range;

/// Bound-level refinement of [`Dominance`] for `B = [s, e)` against `A = [i, j)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intersection {
    /// `i == s` and `j == e`.
    Same,
    /// `s < i` and `j < e`: `B` strictly encloses `A`.
    Container,
    /// `s == i` and `j < e`: `B` encloses `A`, sharing its start.
    Ahead,
    /// `s < i` and `e == j`: `B` encloses `A`, sharing its end.
    Behind,
    /// `i < s` and `e < j`: `A` strictly encloses `B`.
    Fragment,
    /// `i == s` and `e < j`: `A` encloses `B`, sharing its start.
    Start,
    /// `i < s` and `e == j`: `A` encloses `B`, sharing its end.
    End,
    /// `i < s < j < e`: `B` starts inside `A` and runs past its end.
    Overflow,
    /// `s < i < e < j`: `B` starts before `A` and ends inside it.
    Underflow,
    /// `j == s`: `B` starts exactly where `A` ends.
    Next,
    /// `i == e`: `B` ends exactly where `A` starts.
    Previous,
    /// `j < s`: `B` lies after `A` with a gap.
    After,
    /// `e < i`: `B` lies before `A` with a gap.
    Before,
}

impl Intersection {
    pub const ALL: [Intersection; 13] = [
        Intersection::Same,
        Intersection::Container,
        Intersection::Ahead,
        Intersection::Behind,
        Intersection::Fragment,
        Intersection::Start,
        Intersection::End,
        Intersection::Overflow,
        Intersection::Underflow,
        Intersection::Next,
        Intersection::Previous,
        Intersection::After,
        Intersection::Before,
    ];

    pub fn compute(i: usize, j: usize, s: usize, e: usize) -> Result<Self, InvalidInterval> {
        validate(i, j, s, e)?;
        Ok(Self::classify(i, j, s, e))
    }

    pub fn between(a: &Range, b: &Range) -> Self {
        Self::classify(a.start(), a.end(), b.start(), b.end())
    }

    fn classify(i: usize, j: usize, s: usize, e: usize) -> Self {
        match Dominance::classify(i, j, s, e) {
            Dominance::Exact => Intersection::Same,
            Dominance::Contain if s == i => Intersection::Ahead,
            Dominance::Contain if e == j => Intersection::Behind,
            Dominance::Contain => Intersection::Container,
            Dominance::Part if s == i => Intersection::Start,
            Dominance::Part if e == j => Intersection::End,
            Dominance::Part => Intersection::Fragment,
            Dominance::Share if i < s => Intersection::Overflow,
            Dominance::Share => Intersection::Underflow,
            Dominance::None if j == s => Intersection::Next,
            Dominance::None if e == i => Intersection::Previous,
            Dominance::None if j < s => Intersection::After,
            Dominance::None => Intersection::Before,
        }
    }

    pub fn dominance(self) -> Dominance {
        match self {
            Intersection::Same => Dominance::Exact,
            Intersection::Container | Intersection::Ahead | Intersection::Behind => {
                Dominance::Contain
            }
            Intersection::Fragment | Intersection::Start | Intersection::End => Dominance::Part,
            Intersection::Overflow | Intersection::Underflow => Dominance::Share,
            Intersection::Next
            | Intersection::Previous
            | Intersection::After
            | Intersection::Before => Dominance::None,
        }
    }

    /// Tree placement of `B` relative to `A`. Identical and partially
    /// overlapping ranges have no placement.
    pub fn relation(self) -> Option<Relation> {
        match self {
            Intersection::Container | Intersection::Ahead | Intersection::Behind => {
                Some(Relation::Parent)
            }
            Intersection::Fragment | Intersection::Start | Intersection::End => {
                Some(Relation::Child)
            }
            Intersection::Next | Intersection::After => Some(Relation::Next),
            Intersection::Previous | Intersection::Before => Some(Relation::Previous),
            Intersection::Same | Intersection::Overflow | Intersection::Underflow => None,
        }
    }

    /// The same intersection seen from `B`'s side.
    pub fn inverse(self) -> Self {
        match self {
            Intersection::Same => Intersection::Same,
            Intersection::Container => Intersection::Fragment,
            Intersection::Fragment => Intersection::Container,
            Intersection::Ahead => Intersection::Start,
            Intersection::Start => Intersection::Ahead,
            Intersection::Behind => Intersection::End,
            Intersection::End => Intersection::Behind,
            Intersection::Overflow => Intersection::Underflow,
            Intersection::Underflow => Intersection::Overflow,
            Intersection::Next => Intersection::Previous,
            Intersection::Previous => Intersection::Next,
            Intersection::After => Intersection::Before,
            Intersection::Before => Intersection::After,
        }
    }
}

impl fmt::Display for Intersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intersection::Same => "same",
            Intersection::Container => "container",
            Intersection::Ahead => "ahead",
            Intersection::Behind => "behind",
            Intersection::Fragment => "fragment",
            Intersection::Start => "start",
            Intersection::End => "end",
            Intersection::Overflow => "overflow",
            Intersection::Underflow => "underflow",
            Intersection::Next => "next",
            Intersection::Previous => "previous",
            Intersection::After => "after",
            Intersection::Before => "before",
        };
        f.write_str(name)
    }
}
