use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use codespan_reporting::files::SimpleFiles;

use sketch::document::Document;
use sketch::instruction::{Compilation, Environment, Meta};
use sketch::parser::{CompileFailure, Parser};

use crate::compiler;
use crate::error::RunError;

/// Every document known to a run, with its compilation.
///
/// Sources live in a codespan file database, so a document's source id is
/// also the file id its diagnostics point at.
pub struct Library {
    files: SimpleFiles<String, String>,
    /// Documents by name and by file stem.
    documents: HashMap<String, Document>,
    compilations: HashMap<usize, Rc<Compilation>>,
    /// Base directory for resolving relative paths.
    base_dir: PathBuf,
    /// Documents loaded from disk, keyed by canonical path.
    loaded: HashMap<PathBuf, Document>,
}

impl Default for Library {
    fn default() -> Self {
        Library::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Library::with_base_dir(PathBuf::from("."))
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Library {
            files: SimpleFiles::new(),
            documents: HashMap::new(),
            compilations: HashMap::new(),
            base_dir: base_dir.into(),
            loaded: HashMap::new(),
        }
    }

    /// The file database, for emitting diagnostics.
    pub fn files(&self) -> &SimpleFiles<String, String> {
        &self.files
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Register `text` under `name`, sketch and compile it.
    ///
    /// The source stays in the file database even when compiling fails, so
    /// the errors can still be rendered against it.
    pub fn add_source(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Document, RunError> {
        let name = name.into();
        let text = text.into();
        let source_id = self.files.add(name.clone(), text.clone());
        let document = Document::new(source_id, name.clone(), text);

        let sketched = Parser::new(document.clone()).parse();
        let instruction = compiler::compile(&sketched.tree).map_err(|errors| RunError::Compile {
            document: name.clone(),
            errors,
        })?;
        tracing::debug!(
            document = %document,
            nodes = sketched.tree.len(),
            warnings = sketched.warnings.len(),
            "added document"
        );

        let compilation = Compilation {
            document: document.clone(),
            tree: sketched.tree,
            instruction,
            meta: Meta {
                warnings: sketched.warnings,
            },
        };
        self.compilations.insert(source_id, Rc::new(compilation));
        self.register(&name, document.clone());
        Ok(document)
    }

    /// Load a document from disk, relative to the base directory. A path
    /// without an extension gets `.md`. Loading the same file twice returns
    /// the cached document.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Document, RunError> {
        let resolved = self.base_dir.join(path.as_ref());
        let resolved = if resolved.extension().is_none() {
            resolved.with_extension("md")
        } else {
            resolved
        };
        let canonical = resolved.canonicalize().map_err(|source| RunError::Io {
            path: resolved.clone(),
            source,
        })?;
        if let Some(document) = self.loaded.get(&canonical) {
            return Ok(document.clone());
        }

        let text = std::fs::read_to_string(&canonical).map_err(|source| RunError::Io {
            path: canonical.clone(),
            source,
        })?;
        let document = self.add_source(resolved.display().to_string(), text)?;
        self.loaded.insert(canonical, document.clone());
        Ok(document)
    }

    /// A document by the name it was added under, or by its file stem.
    pub fn document(&self, name: &str) -> Option<&Document> {
        self.documents.get(name).or_else(|| {
            let stem = Path::new(name).file_stem()?.to_str()?;
            self.documents.get(stem)
        })
    }

    pub fn compilation(&self, document: &Document) -> Option<&Rc<Compilation>> {
        self.compilations.get(&document.source_id())
    }

    /// Refused candidates reported while sketching `document`.
    pub fn warnings(&self, document: &Document) -> &[CompileFailure] {
        self.compilation(document)
            .map(|compilation| compilation.meta.warnings.as_slice())
            .unwrap_or_default()
    }

    fn register(&mut self, name: &str, document: Document) {
        if let Some(stem) = Path::new(name).file_stem().and_then(|stem| stem.to_str()) {
            if stem != name {
                self.documents
                    .entry(stem.to_string())
                    .or_insert_with(|| document.clone());
            }
        }
        self.documents.insert(name.to_string(), document);
    }
}

impl Environment for Library {
    fn get_compilation(&self, document: &Document) -> Option<Rc<Compilation>> {
        self.compilation(document).cloned()
    }

    fn lookup(&self, name: &str) -> Option<Document> {
        self.document(name).cloned()
    }
}
