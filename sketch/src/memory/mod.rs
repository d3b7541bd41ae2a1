//! Execution memory: a stack of frames plus one output console.
//!
//! Addressing is dynamic across frames:
//!
//! - [`Memory::get`] searches from the innermost frame outwards;
//! - [`Memory::set`] always writes the base frame, the only frame that lives
//!   for the whole execution;
//! - [`Memory::bind`] writes the innermost frame;
//! - [`Memory::compute`] updates the nearest frame that already holds the
//!   address, falling back to the base frame.
//!
//! The frame stack is never empty: removing the last frame immediately
//! replaces it with a fresh one.

mod console;
mod frame;
mod value;

pub use console::{Buffer, Console, Stream};
pub use frame::Frame;
pub use value::Value;

use std::io;

use crate::instruction::{ExecutionFailure, FailureKind};

#[derive(Debug)]
pub struct Memory {
    frames: Vec<Frame>,
    console: Box<dyn Console>,
    step_limit: Option<usize>,
    steps: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

impl Memory {
    /// A memory with one empty frame printing into a fresh [`Buffer`].
    pub fn new() -> Self {
        Memory::with_console(Box::new(Buffer::new()))
    }

    pub fn with_console(console: Box<dyn Console>) -> Self {
        Memory {
            frames: vec![Frame::new()],
            console,
            step_limit: None,
            steps: 0,
        }
    }

    /// Cap the number of loop iterations this memory allows; see [`tick`](Self::tick).
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames from the base outwards.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    fn base_mut(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::new());
        }
        &mut self.frames[0]
    }

    fn innermost_mut(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::new());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn push_value(&mut self, value: Value) {
        self.innermost_mut().push(value);
    }

    /// Pop the innermost frame's stack; `Null` when it is empty.
    pub fn pop_value(&mut self) -> Value {
        self.innermost_mut().pop()
    }

    pub fn peek_value(&self) -> Option<&Value> {
        self.frames.last().and_then(Frame::peek)
    }

    pub fn push_frame(&mut self, frame: Frame) {
        tracing::trace!(depth = self.frames.len() + 1, owner = frame.owner(), "push frame");
        self.frames.push(frame);
    }

    /// Remove and return the innermost frame, discarding its bindings.
    pub fn pop_frame(&mut self) -> Frame {
        let frame = self.frames.pop().unwrap_or_default();
        if self.frames.is_empty() {
            self.frames.push(Frame::new());
        }
        tracing::trace!(depth = self.frames.len(), owner = frame.owner(), "pop frame");
        frame
    }

    /// Remove the innermost frame, merging its leftover stack values and
    /// heap entries into the frame below, and return a copy of it.
    pub fn dump_frame(&mut self) -> Frame {
        let frame = self.pop_frame();
        self.innermost_mut().absorb(frame.clone());
        tracing::trace!(depth = self.frames.len(), "dumped frame into caller");
        frame
    }

    /// Innermost binding of `address`, or `Null`.
    pub fn get(&self, address: &str) -> Value {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(address))
            .cloned()
            .unwrap_or_default()
    }

    /// Bind `address` in the base frame.
    pub fn set(&mut self, address: impl Into<String>, value: Value) {
        self.base_mut().set(address, value);
    }

    /// Bind `address` in the innermost frame.
    pub fn bind(&mut self, address: impl Into<String>, value: Value) {
        self.innermost_mut().set(address, value);
    }

    /// Apply `f` to the nearest binding of `address` in place, or store
    /// `f(Null)` in the base frame when no frame has it. Returns the result.
    pub fn compute<F>(&mut self, address: &str, f: F) -> Value
    where
        F: FnOnce(Value) -> Value,
    {
        let nearest = self
            .frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(address));
        match nearest {
            Some(slot) => {
                let current = std::mem::take(slot);
                *slot = f(current);
                slot.clone()
            }
            None => {
                let value = f(Value::Null);
                self.set(address, value.clone());
                value
            }
        }
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.console.write(text)
    }

    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    /// Install a new console, closing the previous one first.
    ///
    /// The new console is installed even when closing the old one fails;
    /// that failure is reported.
    pub fn set_console(&mut self, console: Box<dyn Console>) -> io::Result<()> {
        let mut previous = self.replace_console(console);
        previous.close()
    }

    /// Install a new console and hand back the previous one unclosed, for
    /// temporary redirection.
    pub fn replace_console(&mut self, console: Box<dyn Console>) -> Box<dyn Console> {
        std::mem::replace(&mut self.console, console)
    }

    /// Count one loop iteration against the step limit, if any.
    pub fn tick(&mut self) -> Result<(), ExecutionFailure> {
        self.steps += 1;
        match self.step_limit {
            Some(limit) if self.steps > limit => Err(FailureKind::StepLimit(limit).into()),
            _ => Ok(()),
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}
