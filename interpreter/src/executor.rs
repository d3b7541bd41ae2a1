use sketch::document::Document;
use sketch::instruction::{Environment, ExecutionFailure, FailureKind};
use sketch::memory::{Buffer, Console, Memory};

use crate::error::RunError;
use crate::library::Library;

/// Deepest frame stack an include may start from.
pub const MAX_DEPTH: usize = 256;

/// Execute `document`'s program against a fresh memory printing into
/// `console`, and hand the memory back.
pub fn execute_program(
    library: &Library,
    document: &Document,
    console: Box<dyn Console>,
) -> Result<Memory, ExecutionFailure> {
    execute_program_with(library, document, Memory::with_console(console))
}

/// Execute `document`'s program against a prepared memory (initial
/// bindings, step limit) and hand it back.
pub fn execute_program_with(
    library: &Library,
    document: &Document,
    mut memory: Memory,
) -> Result<Memory, ExecutionFailure> {
    let compilation = library.get_compilation(document).ok_or_else(|| {
        ExecutionFailure::from(FailureKind::MissingCompilation(document.name().to_string()))
    })?;

    tracing::debug!(document = %document, "execute");
    compilation
        .instruction
        .execute(library, &mut memory)
        .map_err(|failure| failure.in_source(document.source_id()))?;
    Ok(memory)
}

/// Render a standalone source to a string.
pub fn render(source: &str) -> Result<String, RunError> {
    let mut library = Library::new();
    let document = library.add_source("main", source)?;
    let buffer = Buffer::new();
    execute_program(&library, &document, Box::new(buffer.clone()))?;
    Ok(buffer.contents())
}
