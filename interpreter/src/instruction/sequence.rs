use sketch::instruction::{Environment, ExecutionFailure, Instruction};
use sketch::memory::Memory;
use sketch::range::Range;

use super::{Exit, borrowed, in_frame, run_all};

/// The compiled form of one tree node: its parts, in source order.
///
/// Runs in its own frame and dumps it afterwards, so leftovers stay visible
/// to whatever follows the node.
#[derive(Debug)]
pub struct Sequence {
    pub kind: String,
    pub body: Vec<Box<dyn Instruction>>,
    pub range: Range,
}

impl Instruction for Sequence {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn execute(&self, env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        in_frame(memory, self, Exit::Dump, |memory| run_all(&self.body, env, memory))
    }

    fn children(&self) -> Vec<&dyn Instruction> {
        borrowed(&self.body)
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }

    fn describe(&self) -> String {
        format!("{}@{}", self.kind, self.range)
    }
}
