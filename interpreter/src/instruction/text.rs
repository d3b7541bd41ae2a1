use sketch::instruction::{Environment, ExecutionFailure, Instruction};
use sketch::memory::Memory;
use sketch::range::Range;

/// Prints a fixed piece of source text.
#[derive(Debug, Clone)]
pub struct Text {
    pub text: String,
    pub range: Range,
}

impl Text {
    pub fn new(text: impl Into<String>, range: Range) -> Self {
        Text {
            text: text.into(),
            range,
        }
    }
}

impl Instruction for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn execute(&self, _env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure> {
        if self.text.is_empty() {
            return Ok(());
        }
        memory
            .print(&self.text)
            .map_err(|error| ExecutionFailure::from(error).at(Some(self.range)))
    }

    fn range(&self) -> Option<Range> {
        Some(self.range)
    }
}
