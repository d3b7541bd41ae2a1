use std::collections::HashMap;

use super::value::Value;

/// One isolated scope: a value stack and an address-keyed heap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    stack: Vec<Value>,
    heap: HashMap<String, Value>,
    /// Describes the instruction that pushed this frame, for diagnostics.
    owner: Option<String>,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    /// An empty frame tagged with the instruction that owns it.
    pub fn owned_by(owner: impl Into<String>) -> Self {
        Frame {
            owner: Some(owner.into()),
            ..Frame::default()
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Top of the stack, or `Null` when empty.
    pub fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or_default()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.stack.last()
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn get(&self, address: &str) -> Option<&Value> {
        self.heap.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut Value> {
        self.heap.get_mut(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.heap.contains_key(address)
    }

    pub fn set(&mut self, address: impl Into<String>, value: Value) {
        self.heap.insert(address.into(), value);
    }

    pub fn heap(&self) -> &HashMap<String, Value> {
        &self.heap
    }

    /// Move `other`'s leftovers into this frame: stack values are appended,
    /// heap entries overwrite.
    pub fn absorb(&mut self, other: Frame) {
        self.stack.extend(other.stack);
        self.heap.extend(other.heap);
    }
}
