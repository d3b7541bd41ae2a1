use std::fmt;
use std::rc::Rc;

use crate::range::Range;

/// A re-readable source text.
///
/// Documents are compared by `source_id` only: the id is the file id handed
/// out by the `codespan-reporting` file database, so two documents with the
/// same id are the same source even when loaded twice.
#[derive(Clone)]
pub struct Document {
    source_id: usize,
    name: Rc<str>,
    text: Rc<str>,
}

impl Document {
    pub fn new(source_id: usize, name: impl Into<String>, text: impl Into<String>) -> Self {
        Document {
            source_id,
            name: Rc::from(name.into()),
            text: Rc::from(text.into()),
        }
    }

    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The range covering the whole text.
    pub fn extent(&self) -> Range {
        Range::new(0, self.text.len())
    }

    /// Source text under `range`, or an empty string when the range does not
    /// fall on character boundaries inside this document.
    pub fn slice(&self, range: Range) -> &str {
        self.text.get(range.as_std()).unwrap_or("")
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.source_id == other.source_id
    }
}

impl Eq for Document {}

impl std::hash::Hash for Document {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.source_id.hash(state);
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("source_id", &self.source_id)
            .field("name", &self.name)
            .field("len", &self.text.len())
            .finish()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
