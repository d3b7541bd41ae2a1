use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser as CmarkParser, Tag};

use super::Sketched;
use crate::document::Document;
use crate::parser::error::CompileFailure;
use crate::range::Range;
use crate::tree::{NodeId, RangeTree, Sketch};

/// Kind of the root node every document tree starts with.
pub const DOCUMENT_KIND: &str = "document";

/// Build the range tree of a Markdown document.
///
/// Every element start and every inline code span becomes a candidate.
/// Candidates are weighted by nesting depth, so when two elements share the
/// exact same bounds the inner one wins the claim.
pub(crate) fn sketch(document: &Document) -> Sketched {
    let root_sketch = Sketch::new(DOCUMENT_KIND, document.name()).with_weight(u32::MAX);
    let mut tree = RangeTree::new(document.clone(), root_sketch);
    let mut warnings = Vec::new();
    let Some(root) = tree.root() else {
        return Sketched { tree, warnings };
    };

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = CmarkParser::new_ext(document.text(), options);

    let mut state = SketchState {
        tree: &mut tree,
        warnings: &mut warnings,
        anchor: root,
        depth: 0,
        source_id: document.source_id(),
    };
    for (event, span) in parser.into_offset_iter() {
        match event {
            Event::Start(tag) => {
                let (kind, name) = describe(&tag);
                state.offer(Range::from(span), kind, name);
                state.depth += 1;
            }
            Event::End(_) => state.depth = state.depth.saturating_sub(1),
            Event::Code(code) => state.offer(Range::from(span), "code", code.to_string()),
            _ => {}
        }
    }

    tracing::debug!(
        document = %document,
        nodes = tree.len(),
        rejected = warnings.len(),
        "sketched document"
    );
    Sketched { tree, warnings }
}

struct SketchState<'a> {
    tree: &'a mut RangeTree,
    warnings: &'a mut Vec<CompileFailure>,
    /// Last placed node. Events arrive in document order, so the next
    /// candidate is usually close to it.
    anchor: NodeId,
    depth: u32,
    source_id: usize,
}

impl SketchState<'_> {
    fn offer(&mut self, range: Range, kind: &str, name: String) {
        let sketch = Sketch::new(kind, name).with_weight(self.depth + 1);
        let node = self.tree.create(range, sketch);
        match self.tree.claim(self.anchor, node) {
            Ok(_) => self.anchor = node,
            Err(error) => {
                self.warnings
                    .push(CompileFailure::rejected(kind, &error, self.source_id));
            }
        }
    }
}

fn describe(tag: &Tag<'_>) -> (&'static str, String) {
    match tag {
        Tag::Paragraph => ("paragraph", String::new()),
        Tag::Heading { level, .. } => ("heading", heading_level_to_u8(level).to_string()),
        Tag::BlockQuote(_) => ("blockquote", String::new()),
        Tag::CodeBlock(CodeBlockKind::Fenced(language)) => ("code_block", language.to_string()),
        Tag::CodeBlock(CodeBlockKind::Indented) => ("code_block", String::new()),
        Tag::List(Some(start)) => ("ordered_list", start.to_string()),
        Tag::List(None) => ("list", String::new()),
        Tag::Item => ("item", String::new()),
        Tag::Table(_) => ("table", String::new()),
        Tag::TableHead => ("table_head", String::new()),
        Tag::TableRow => ("table_row", String::new()),
        Tag::TableCell => ("table_cell", String::new()),
        Tag::Emphasis => ("emphasis", String::new()),
        Tag::Strong => ("strong", String::new()),
        Tag::Strikethrough => ("strikethrough", String::new()),
        Tag::Link { dest_url, .. } => ("link", dest_url.to_string()),
        Tag::Image { dest_url, .. } => ("image", dest_url.to_string()),
        _ => ("element", String::new()),
    }
}

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
