mod error;

pub use error::{ExecutionFailure, FailureKind};

use std::fmt;
use std::rc::Rc;

use crate::document::Document;
use crate::memory::Memory;
use crate::parser::CompileFailure;
use crate::range::Range;
use crate::tree::RangeTree;

/// A unit of a compiled program.
///
/// Composite instructions own their children and decide, per opcode,
/// whether a child's frame is popped (fully isolated) or dumped (merged into
/// the caller) once the child finishes.
pub trait Instruction: fmt::Debug {
    /// Opcode name, used in frame owners and diagnostics.
    fn name(&self) -> &'static str;

    fn execute(&self, env: &dyn Environment, memory: &mut Memory) -> Result<(), ExecutionFailure>;

    fn children(&self) -> Vec<&dyn Instruction> {
        Vec::new()
    }

    /// Source range this instruction was compiled from.
    fn range(&self) -> Option<Range> {
        None
    }

    /// `name@range`, for frame owners.
    fn describe(&self) -> String {
        match self.range() {
            Some(range) => format!("{}@{}", self.name(), range),
            None => self.name().to_string(),
        }
    }
}

/// Cross-document lookups available to instructions while executing.
pub trait Environment {
    fn get_compilation(&self, document: &Document) -> Option<Rc<Compilation>>;

    /// Resolve a document by the name used to refer to it in source.
    fn lookup(&self, name: &str) -> Option<Document>;
}

/// An environment that knows no documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct Isolated;

impl Environment for Isolated {
    fn get_compilation(&self, _document: &Document) -> Option<Rc<Compilation>> {
        None
    }

    fn lookup(&self, _name: &str) -> Option<Document> {
        None
    }
}

/// A document together with its range tree and compiled program.
#[derive(Debug)]
pub struct Compilation {
    pub document: Document,
    pub tree: RangeTree,
    pub instruction: Box<dyn Instruction>,
    pub meta: Meta,
}

/// What compiling a document reported besides the program itself.
#[derive(Debug, Default)]
pub struct Meta {
    /// Candidate ranges that were refused while building the tree.
    pub warnings: Vec<CompileFailure>,
}
