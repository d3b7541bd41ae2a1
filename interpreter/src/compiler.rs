//! Turns a document's range tree into a program.
//!
//! Gaps print their source text verbatim, leaves print their own source, and
//! inline code spans starting with `$` become directives. A block directive
//! (`$if`, `$repeat`, `$capture`) takes every part that follows it in the
//! same node as its body.

use sketch::instruction::Instruction;
use sketch::parser::{CompileFailure, DOCUMENT_KIND};
use sketch::range::Range;
use sketch::tree::{Child, NodeId, RangeTree};

use crate::directive::{self, Directive};
use crate::instruction::{
    Append, Bind, Capture, Conditional, Get, Include, Print, Repeat, Sequence, Set, Text,
};

const CODE_KIND: &str = "code";

/// Compile the whole tree. All malformed directives are reported together.
pub fn compile(tree: &RangeTree) -> Result<Box<dyn Instruction>, Vec<CompileFailure>> {
    let mut compiler = Compiler {
        tree,
        errors: Vec::new(),
    };
    let mut body: Vec<Box<dyn Instruction>> =
        tree.top_level().map(|id| compiler.node(id)).collect();
    let program: Box<dyn Instruction> = match body.pop() {
        Some(only) if body.is_empty() => only,
        Some(last) => {
            body.push(last);
            Box::new(Sequence {
                kind: DOCUMENT_KIND.to_string(),
                body,
                range: tree.document().extent(),
            })
        }
        None => Box::new(Text::new("", tree.document().extent())),
    };
    if compiler.errors.is_empty() {
        tracing::debug!(document = %tree.document(), "compiled document");
        Ok(program)
    } else {
        Err(compiler.errors)
    }
}

struct Compiler<'t> {
    tree: &'t RangeTree,
    errors: Vec<CompileFailure>,
}

impl Compiler<'_> {
    fn node(&mut self, id: NodeId) -> Box<dyn Instruction> {
        let range = self.tree.range(id);
        let sketch = self.tree.sketch(id);

        if sketch.kind == CODE_KIND {
            if let Some(parsed) = directive::parse(&sketch.name) {
                return match parsed {
                    Ok(directive) if !directive.is_block() => self.simple(directive, range),
                    // A block directive with nothing after it in its node.
                    Ok(directive) => self.block(directive, range, Vec::new()),
                    Err(message) => self.error(message, range),
                };
            }
        }

        if self.tree.node(id).first_child().is_none() {
            return Box::new(Text::new(self.tree.text(id), range));
        }

        let kind = sketch.kind.clone();
        let parts = self.tree.flat_children(id);
        let mut body = self.parts(&parts);
        if body.len() == 1 {
            if let Some(only) = body.pop() {
                return only;
            }
        }
        Box::new(Sequence { kind, body, range })
    }

    /// Compile a run of siblings, letting block directives swallow the rest.
    fn parts(&mut self, parts: &[Child]) -> Vec<Box<dyn Instruction>> {
        let mut body = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            let id = match part {
                Child::Gap(range) => {
                    body.push(self.gap(*range));
                    continue;
                }
                Child::Node(id) => *id,
            };
            let block = self.block_directive(id);
            match block {
                Some(directive) => {
                    let range = self.tree.range(id);
                    let rest = self.parts(&trim_leading_blanks(self.tree, &parts[index + 1..]));
                    body.push(self.block(directive, range, rest));
                    return body;
                }
                None => body.push(self.node(id)),
            }
        }
        body
    }

    fn block_directive(&self, id: NodeId) -> Option<Directive> {
        let sketch = self.tree.sketch(id);
        if sketch.kind != CODE_KIND {
            return None;
        }
        match directive::parse(&sketch.name)? {
            Ok(directive) if directive.is_block() => Some(directive),
            _ => None,
        }
    }

    fn gap(&self, range: Range) -> Box<dyn Instruction> {
        Box::new(Text::new(self.tree.document().slice(range), range))
    }

    fn simple(&mut self, directive: Directive, range: Range) -> Box<dyn Instruction> {
        match directive {
            Directive::Print(name) => Box::new(Print {
                value: Box::new(Get { name, range }),
                range,
            }),
            Directive::Set { name, value } => Box::new(Set { name, value, range }),
            Directive::Let { name, value } => Box::new(Bind { name, value, range }),
            Directive::Append { name, value } => Box::new(Append { name, value, range }),
            Directive::Include(document) => Box::new(Include { document, range }),
            block => self.block(block, range, Vec::new()),
        }
    }

    fn block(
        &mut self,
        directive: Directive,
        range: Range,
        body: Vec<Box<dyn Instruction>>,
    ) -> Box<dyn Instruction> {
        match directive {
            Directive::If(name) => Box::new(Conditional {
                condition: Box::new(Get { name, range }),
                body,
                range,
            }),
            Directive::Repeat(count) => Box::new(Repeat { count, body, range }),
            Directive::Capture(name) => Box::new(Capture { name, body, range }),
            simple => self.simple(simple, range),
        }
    }

    fn error(&mut self, message: String, range: Range) -> Box<dyn Instruction> {
        let source_id = self.tree.document().source_id();
        self.errors.push(
            CompileFailure::error(format!("invalid directive: {}", message), range, source_id)
                .with_note("directives look like `$name`, `$name = text` or `$if name`"),
        );
        Box::new(Text::new("", range))
    }
}

/// Drop the spaces and tabs that separate a block directive from its body.
fn trim_leading_blanks(tree: &RangeTree, parts: &[Child]) -> Vec<Child> {
    let mut parts = parts.to_vec();
    if let Some(Child::Gap(range)) = parts.first().copied() {
        let text = tree.document().slice(range);
        let skipped = text.len() - text.trim_start_matches([' ', '\t']).len();
        let trimmed = Range::new(range.start() + skipped, range.len() - skipped);
        if trimmed.is_empty() {
            parts.remove(0);
        } else {
            parts[0] = Child::Gap(trimmed);
        }
    }
    parts
}
