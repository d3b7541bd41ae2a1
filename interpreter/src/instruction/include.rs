use sketch::instruction::{Environment, ExecutionFailure, FailureKind, Instruction};
use sketch::memory::Memory;
use sketch::range::Range;

use super::{Exit, in_frame};
use crate::executor::MAX_DEPTH;

/// Executes another document's program in a frame dumped into the caller,
/// so bindings it leaves behind are visible after the include.
#[derive(Debug, Clone)]
pub struct Include {
    pub document: String,
    pub range: Range,
}

impl Instruction for Include {
    fn name(&self) -> &'static str {
        "include"
    }

    fn execute(&self, env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        let fail = |kind: FailureKind| ExecutionFailure::from(kind).at(Some(self.range));
        let document = env
            .lookup(&self.document)
            .ok_or_else(|| fail(FailureKind::MissingDocument(self.document.clone())))?;
        let compilation = env
            .get_compilation(&document)
            .ok_or_else(|| fail(FailureKind::MissingCompilation(document.name().to_string())))?;
        if memory.depth() >= MAX_DEPTH {
            return Err(fail(FailureKind::DepthLimit(MAX_DEPTH)));
        }

        tracing::debug!(document = %document, depth = memory.depth(), "include");
        in_frame(memory, self, Exit::Dump, |memory| {
            compilation
                .instruction
                .execute(env, memory)
                .map_err(|failure| match failure.range {
                    Some(_) => failure.in_source(document.source_id()),
                    None => failure,
                })
        })
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}
