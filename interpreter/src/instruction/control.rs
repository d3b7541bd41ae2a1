use sketch::instruction::{Environment, ExecutionFailure, FailureKind, Instruction};
use sketch::memory::{Buffer, Memory, Value};
use sketch::range::Range;

use super::variable::append;
use super::{Exit, borrowed, in_frame, run_all};
use crate::directive::Count;

/// Runs `body` when `condition` leaves a non-null value on the stack.
/// The body's frame is discarded afterwards.
#[derive(Debug)]
pub struct Conditional {
    pub condition: Box<dyn Instruction>,
    pub body: Vec<Box<dyn Instruction>>,
    pub range: Range,
}

impl Instruction for Conditional {
    fn name(&self) -> &'static str {
        "if"
    }

    fn execute(&self, env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        in_frame(memory, self, Exit::Pop, |memory| {
            self.condition.execute(env, memory)?;
            if memory.pop_value().is_null() {
                return Ok(());
            }
            run_all(&self.body, env, memory)
        })
    }

    fn children(&self) -> Vec<&dyn Instruction> {
        let mut children = vec![self.condition.as_ref()];
        children.extend(borrowed(&self.body));
        children
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}

/// Runs `body` a fixed or variable number of times, one frame per
/// iteration, each dumped into the loop's frame.
#[derive(Debug)]
pub struct Repeat {
    pub count: Count,
    pub body: Vec<Box<dyn Instruction>>,
    pub range: Range,
}

impl Repeat {
    fn times(&self, memory: &Memory) -> Result<usize, ExecutionFailure> {
        match &self.count {
            Count::Literal(times) => Ok(*times),
            Count::Variable(name) => match memory.get(name) {
                Value::Null => Err(FailureKind::NullValue(name.clone()).into()),
                Value::Text(text) => text
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| FailureKind::InvalidCount(text).into()),
            },
        }
    }
}

impl Instruction for Repeat {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn execute(&self, env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        let times = self.times(memory).map_err(|failure| failure.at(Some(self.range)))?;
        tracing::trace!(times, range = %self.range, "repeat");
        in_frame(memory, self, Exit::Dump, |memory| {
            for _ in 0..times {
                memory.tick()?;
                in_frame(memory, self, Exit::Dump, |memory| {
                    run_all(&self.body, env, memory)
                })?;
            }
            Ok(())
        })
    }

    fn children(&self) -> Vec<&dyn Instruction> {
        borrowed(&self.body)
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}

/// Redirects the output of `body` into a buffer and appends it to `name`.
///
/// The previous console is restored on every path out; the capture buffer
/// is closed once the body finishes.
#[derive(Debug)]
pub struct Capture {
    pub name: String,
    pub body: Vec<Box<dyn Instruction>>,
    pub range: Range,
}

impl Instruction for Capture {
    fn name(&self) -> &'static str {
        "capture"
    }

    fn execute(&self, env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        let buffer = Buffer::new();
        let previous = memory.replace_console(Box::new(buffer.clone()));
        let result = in_frame(memory, self, Exit::Pop, |memory| {
            run_all(&self.body, env, memory)
        });
        let restored = memory.set_console(previous);
        result?;
        restored.map_err(|error| ExecutionFailure::from(error).at(Some(self.range)))?;

        let captured = buffer.contents();
        tracing::trace!(name = %self.name, bytes = captured.len(), "captured output");
        memory.compute(&self.name, |current| append(current, &captured));
        Ok(())
    }

    fn children(&self) -> Vec<&dyn Instruction> {
        borrowed(&self.body)
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}
