pub mod error;
mod sketcher;

pub use error::CompileFailure;
pub use sketcher::DOCUMENT_KIND;

use crate::document::Document;
use crate::tree::RangeTree;

/// A document's range tree, plus the candidates that could not be placed.
#[derive(Debug, Clone)]
pub struct Sketched {
    pub tree: RangeTree,
    pub warnings: Vec<CompileFailure>,
}

/// Parser entry point.
pub struct Parser {
    document: Document,
}

impl Parser {
    pub fn new(document: Document) -> Self {
        Parser { document }
    }

    /// Recognize the document's Markdown structure and build its range tree.
    ///
    /// Refused candidates never fail the parse; they are reported as
    /// warnings and their text is left to the surrounding nodes.
    pub fn parse(&self) -> Sketched {
        sketcher::sketch(&self.document)
    }
}
