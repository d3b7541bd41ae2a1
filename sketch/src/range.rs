use std::cmp::Ordering;
use std::fmt;

use crate::algebra::{Dominance, Intersection, Relation};

/// A half-open byte interval `[position, position + length)` over one document.
///
/// Ranges order by position first, then by decreasing length, so a range
/// sorts before every shorter range that starts at the same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    position: usize,
    length: usize,
}

impl Range {
    pub fn new(position: usize, length: usize) -> Self {
        Range { position, length }
    }

    /// Build a range from its two bounds. Returns `None` when `end < start`.
    pub fn between(start: usize, end: usize) -> Option<Self> {
        end.checked_sub(start).map(|length| Range::new(start, length))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn start(&self) -> usize {
        self.position
    }

    /// One past the last offset, saturating at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.position.saturating_add(self.length)
    }

    /// One past the last offset, or `None` when it does not fit a `usize`.
    pub fn checked_end(&self) -> Option<usize> {
        self.position.checked_add(self.length)
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start() <= offset && offset < self.end()
    }

    /// How `other` relates to `self` (see [`Dominance`]).
    pub fn dominance(&self, other: &Range) -> Dominance {
        Dominance::between(self, other)
    }

    pub fn intersection(&self, other: &Range) -> Intersection {
        Intersection::between(self, other)
    }

    pub fn relation(&self, other: &Range) -> Option<Relation> {
        Relation::between(self, other)
    }

    pub fn as_std(&self) -> std::ops::Range<usize> {
        self.start()..self.end()
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(range: std::ops::Range<usize>) -> Self {
        Range::new(range.start, range.end.saturating_sub(range.start))
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(range: Range) -> Self {
        range.as_std()
    }
}

impl Ord for Range {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| other.length.cmp(&self.length))
    }
}

impl PartialOrd for Range {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start(), self.end())
    }
}
