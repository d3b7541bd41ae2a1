//! Opcodes produced by the compiler.
//!
//! Every opcode stamps failures raised under it with its own source range
//! unless a deeper instruction already did.

mod control;
mod include;
mod sequence;
mod text;
mod variable;

pub use control::{Capture, Conditional, Repeat};
pub use include::Include;
pub use sequence::Sequence;
pub use text::Text;
pub use variable::{Append, Bind, Get, Print, Set};

use sketch::instruction::{Environment, ExecutionFailure, Instruction};
use sketch::memory::{Frame, Memory};

/// What happens to a child frame once its body finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Discard the frame.
    Pop,
    /// Merge the frame into the caller.
    Dump,
}

/// Run `body` inside a fresh frame owned by `owner`.
///
/// The frame is removed on failure too, so the caller's frame depth is the
/// same on every path out.
pub(crate) fn in_frame<F>(
    memory: &mut Memory,
    owner: &dyn Instruction,
    exit: Exit,
    body: F,
) -> Result<(), ExecutionFailure>
where
    F: FnOnce(&mut Memory) -> Result<(), ExecutionFailure>,
{
    memory.push_frame(Frame::owned_by(owner.describe()));
    let result = body(memory);
    match exit {
        Exit::Pop => {
            memory.pop_frame();
        }
        Exit::Dump => {
            memory.dump_frame();
        }
    }
    result.map_err(|failure| failure.at(owner.range()))
}

/// Execute every instruction of `body` in order, stopping at the first failure.
pub(crate) fn run_all(
    body: &[Box<dyn Instruction>],
    env: &dyn Environment,
    memory: &mut Memory,
) -> Result<(), ExecutionFailure> {
    for instruction in body {
        instruction.execute(env, memory)?;
    }
    Ok(())
}

fn borrowed(body: &[Box<dyn Instruction>]) -> Vec<&dyn Instruction> {
    body.iter().map(|instruction| instruction.as_ref()).collect()
}
