use std::io;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use thiserror::Error;

use crate::range::Range;

#[derive(Debug, Error)]
pub enum FailureKind {
    #[error("no compilation available for document '{0}'")]
    MissingCompilation(String),
    #[error("unknown document '{0}'")]
    MissingDocument(String),
    #[error("'{0}' is null")]
    NullValue(String),
    #[error("'{0}' is not a valid count")]
    InvalidCount(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("step limit of {0} exceeded")]
    StepLimit(usize),
    #[error("frame depth limit of {0} exceeded")]
    DepthLimit(usize),
}

/// A failure raised while executing, with the source range of the
/// instruction that raised it when known.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ExecutionFailure {
    #[source]
    pub kind: FailureKind,
    pub range: Option<Range>,
    pub source_id: Option<usize>,
}

impl ExecutionFailure {
    /// Attach a provenance range unless one is already set, so the
    /// innermost instruction's range wins.
    pub fn at(mut self, range: Option<Range>) -> Self {
        if self.range.is_none() {
            self.range = range;
        }
        self
    }

    /// Attach the source id unless one is already set.
    pub fn in_source(mut self, source_id: usize) -> Self {
        if self.source_id.is_none() {
            self.source_id = Some(source_id);
        }
        self
    }

    /// Convert to a codespan-reporting Diagnostic, when the failure has a
    /// location to point at.
    pub fn to_diagnostic(&self) -> Option<Diagnostic<usize>> {
        let (range, source_id) = (self.range?, self.source_id?);
        Some(
            Diagnostic::new(Severity::Error)
                .with_message(self.to_string())
                .with_labels(vec![Label::primary(source_id, range.as_std())]),
        )
    }
}

impl From<FailureKind> for ExecutionFailure {
    fn from(kind: FailureKind) -> Self {
        ExecutionFailure {
            kind,
            range: None,
            source_id: None,
        }
    }
}

impl From<io::Error> for ExecutionFailure {
    fn from(error: io::Error) -> Self {
        FailureKind::Io(error).into()
    }
}
