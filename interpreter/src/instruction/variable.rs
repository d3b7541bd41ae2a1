use sketch::instruction::{Environment, ExecutionFailure, Instruction};
use sketch::memory::{Memory, Value};
use sketch::range::Range;

use super::{Exit, in_frame};

/// Pushes the value bound to `name` onto the current frame's stack.
#[derive(Debug, Clone)]
pub struct Get {
    pub name: String,
    pub range: Range,
}

impl Instruction for Get {
    fn name(&self) -> &'static str {
        "get"
    }

    fn execute(&self, _env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        let value = memory.get(&self.name);
        tracing::trace!(name = %self.name, value = value.type_name(), "get");
        memory.push_value(value);
        Ok(())
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}

/// Evaluates `value` in a scratch frame and prints what it leaves on the stack.
#[derive(Debug)]
pub struct Print {
    pub value: Box<dyn Instruction>,
    pub range: Range,
}

impl Instruction for Print {
    fn name(&self) -> &'static str {
        "print"
    }

    fn execute(&self, env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        in_frame(memory, self, Exit::Pop, |memory| {
            self.value.execute(env, memory)?;
            match memory.pop_value() {
                Value::Null => Ok(()),
                Value::Text(text) => memory.print(&text).map_err(ExecutionFailure::from),
            }
        })
    }

    fn children(&self) -> Vec<&dyn Instruction> {
        vec![self.value.as_ref()]
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}

/// Binds `name` in the base frame.
#[derive(Debug, Clone)]
pub struct Set {
    pub name: String,
    pub value: String,
    pub range: Range,
}

impl Instruction for Set {
    fn name(&self) -> &'static str {
        "set"
    }

    fn execute(&self, _env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        memory.set(self.name.clone(), Value::text(self.value.as_str()));
        Ok(())
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}

/// Binds `name` in the innermost frame.
#[derive(Debug, Clone)]
pub struct Bind {
    pub name: String,
    pub value: String,
    pub range: Range,
}

impl Instruction for Bind {
    fn name(&self) -> &'static str {
        "bind"
    }

    fn execute(&self, _env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        memory.bind(self.name.clone(), Value::text(self.value.as_str()));
        Ok(())
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}

/// Appends text to the nearest binding of `name`. A null binding counts as
/// empty text.
#[derive(Debug, Clone)]
pub struct Append {
    pub name: String,
    pub value: String,
    pub range: Range,
}

impl Instruction for Append {
    fn name(&self) -> &'static str {
        "append"
    }

    fn execute(&self, _env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        memory.compute(&self.name, |current| append(current, &self.value));
        Ok(())
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}

pub(crate) fn append(current: Value, suffix: &str) -> Value {
    match current {
        Value::Null => Value::text(suffix),
        Value::Text(mut text) => {
            text.push_str(suffix);
            Value::Text(text)
        }
    }
}
