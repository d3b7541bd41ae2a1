use thiserror::Error;

use super::NodeId;
use crate::range::Range;

/// Why a candidate range was refused. The tree is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No slot near the anchor can hold the candidate.
    #[error("range {candidate} does not fit anywhere near {anchor}")]
    OutOfBounds { anchor: Range, candidate: Range },

    /// Another node already claims exactly this range.
    #[error(
        "range {range} is already taken (occupant weight {occupant_weight}, candidate weight {candidate_weight})"
    )]
    Takeover {
        occupant: NodeId,
        range: Range,
        occupant_weight: u32,
        candidate_weight: u32,
    },

    /// The candidate partially overlaps a node without nesting.
    #[error("range {candidate} clashes with {occupant}")]
    Clash { occupant: Range, candidate: Range },
}

impl TreeError {
    /// The refused range.
    pub fn candidate(&self) -> Range {
        match self {
            TreeError::OutOfBounds { candidate, .. } => *candidate,
            TreeError::Takeover { range, .. } => *range,
            TreeError::Clash { candidate, .. } => *candidate,
        }
    }

    /// The range that stood in the way, when there is one.
    pub fn occupant(&self) -> Option<Range> {
        match self {
            TreeError::OutOfBounds { .. } => None,
            TreeError::Takeover { range, .. } => Some(*range),
            TreeError::Clash { occupant, .. } => Some(*occupant),
        }
    }
}
