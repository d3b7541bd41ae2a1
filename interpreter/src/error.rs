use std::io;
use std::path::PathBuf;

use codespan_reporting::diagnostic::Diagnostic;
use thiserror::Error;

use sketch::instruction::ExecutionFailure;
use sketch::parser::CompileFailure;

/// Anything that can stop a document from rendering.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} compile error(s) in '{document}'", errors.len())]
    Compile {
        document: String,
        errors: Vec<CompileFailure>,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionFailure),
}

impl RunError {
    /// Diagnostics for every located error; unlocated errors yield none.
    pub fn diagnostics(&self) -> Vec<Diagnostic<usize>> {
        match self {
            RunError::Io { .. } => Vec::new(),
            RunError::Compile { errors, .. } => {
                errors.iter().map(CompileFailure::to_diagnostic).collect()
            }
            RunError::Execution(failure) => failure.to_diagnostic().into_iter().collect(),
        }
    }
}
