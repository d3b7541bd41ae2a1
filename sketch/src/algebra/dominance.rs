use std::fmt;

use super::{InvalidInterval, validate};
use crate::range::Range;

/// Containment class of `B = [s, e)` relative to `A = [i, j)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dominance {
    /// Both bounds are equal.
    Exact,
    /// `B` encloses `A`, differing in at least one bound.
    Contain,
    /// `A` encloses `B`, differing in at least one bound.
    Part,
    /// The ranges overlap but neither encloses the other.
    Share,
    /// Disjoint or merely touching.
    None,
}

impl Dominance {
    pub const ALL: [Dominance; 5] = [
        Dominance::Exact,
        Dominance::Contain,
        Dominance::Part,
        Dominance::Share,
        Dominance::None,
    ];

    /// Classify `[s, e)` against `[i, j)`, rejecting reversed bounds.
    pub fn compute(i: usize, j: usize, s: usize, e: usize) -> Result<Self, InvalidInterval> {
        validate(i, j, s, e)?;
        Ok(Self::classify(i, j, s, e))
    }

    /// Classify `b` against `a`. Ranges are always well formed, so this
    /// cannot fail.
    pub fn between(a: &Range, b: &Range) -> Self {
        Self::classify(a.start(), a.end(), b.start(), b.end())
    }

    pub(crate) fn classify(i: usize, j: usize, s: usize, e: usize) -> Self {
        if i == s && j == e {
            Dominance::Exact
        } else if s <= i && j <= e {
            Dominance::Contain
        } else if i <= s && e <= j {
            Dominance::Part
        } else if (i < s && s < j && j < e) || (s < i && i < e && e < j) {
            Dominance::Share
        } else {
            Dominance::None
        }
    }

    /// The same relation seen from `B`'s side.
    pub fn inverse(self) -> Self {
        match self {
            Dominance::Contain => Dominance::Part,
            Dominance::Part => Dominance::Contain,
            other => other,
        }
    }
}

impl fmt::Display for Dominance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dominance::Exact => "exact",
            Dominance::Contain => "contain",
            Dominance::Part => "part",
            Dominance::Share => "share",
            Dominance::None => "none",
        };
        f.write_str(name)
    }
}
