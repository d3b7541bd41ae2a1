//! Interval algebra over half-open ranges.
//!
//! Every classification answers the same question: given `A = [i, j)` and
//! `B = [s, e)`, where does `B` sit relative to `A`? Three views exist:
//!
//! - [`Dominance`]: five-way containment class.
//! - [`Intersection`]: refinement of the containment class that keeps
//!   track of shared and touching bounds.
//! - [`Relation`]: four-way placement of `B` in a tree that holds `A`.
//!
//! The range tree consults nothing but these functions for positional logic.
//! When empty ranges make several classes apply at once, the order is
//! exact, then containment, then partial overlap, then disjoint: an empty
//! range lying on a bound of another range counts as inside it.

mod dominance;
mod intersection;
mod relation;

pub use dominance::Dominance;
pub use intersection::Intersection;
pub use relation::Relation;

use thiserror::Error;

/// Raised when an interval's end lies before its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid interval: end {end} lies before start {start}")]
pub struct InvalidInterval {
    pub start: usize,
    pub end: usize,
}

fn validate(i: usize, j: usize, s: usize, e: usize) -> Result<(), InvalidInterval> {
    if i > j {
        return Err(InvalidInterval { start: i, end: j });
    }
    if s > e {
        return Err(InvalidInterval { start: s, end: e });
    }
    Ok(())
}
