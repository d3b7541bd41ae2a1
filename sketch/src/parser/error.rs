use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use thiserror::Error;

use crate::range::Range;
use crate::tree::TreeError;

/// Compile-time errors and warnings with source location information.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileFailure {
    pub message: String,
    pub range: Range,
    pub source_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl CompileFailure {
    pub fn error(message: impl Into<String>, range: Range, source_id: usize) -> Self {
        CompileFailure {
            message: message.into(),
            range,
            source_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>, range: Range, source_id: usize) -> Self {
        CompileFailure {
            message: message.into(),
            range,
            source_id,
            severity: Severity::Warning,
            notes: Vec::new(),
        }
    }

    /// A refused candidate range, reported as a warning on that range.
    pub fn rejected(kind: &str, error: &TreeError, source_id: usize) -> Self {
        let failure = CompileFailure::warning(
            format!("ignored {}: {}", kind, error),
            error.candidate(),
            source_id,
        );
        match error.occupant() {
            Some(occupant) => failure.with_note(format!("conflicts with the range at {}", occupant)),
            None => failure,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.source_id, self.range.as_std())])
            .with_notes(self.notes.clone())
    }
}
