//! Source collaborators: the declaration parser and the library loader.

use std::collections::BTreeMap;

use rook_syntax::FileSyntax;

/// Supplies declaration trees to the manager.
pub trait SourceProvider {
    /// Parse the document at `path`. `None` when it no longer exists or
    /// cannot be read.
    fn parse_document(&mut self, path: &str) -> Option<FileSyntax>;

    /// Every document of the library called `name`.
    fn load_library(&mut self, name: &str) -> Option<Vec<FileSyntax>>;
}

/// In-memory provider holding pre-built trees.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    documents: BTreeMap<String, FileSyntax>,
    libraries: BTreeMap<String, Vec<FileSyntax>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, syntax: FileSyntax) -> Self {
        self.insert(syntax);
        self
    }

    pub fn with_library(mut self, name: &str, documents: Vec<FileSyntax>) -> Self {
        self.libraries.insert(name.to_string(), documents);
        self
    }

    /// Add or replace the document at `syntax.path`.
    pub fn insert(&mut self, syntax: FileSyntax) {
        self.documents.insert(syntax.path.clone(), syntax);
    }

    pub fn remove(&mut self, path: &str) -> Option<FileSyntax> {
        self.documents.remove(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}

impl SourceProvider for MemoryProvider {
    fn parse_document(&mut self, path: &str) -> Option<FileSyntax> {
        self.documents.get(path).cloned()
    }

    fn load_library(&mut self, name: &str) -> Option<Vec<FileSyntax>> {
        self.libraries.get(name).cloned()
    }
}
