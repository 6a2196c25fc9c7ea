//! Per-file bookkeeping shared by every phase.

use rook_model::{Declaration, Diagnostics, LibraryId, SpaceId, SpaceRef};
use rook_syntax::{FileSyntax, Location, Range};

/// Something a name can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Declaration(Declaration),
    Space(SpaceRef),
}

/// A back-link this file wrote into a record it may not own. Replayed in
/// reverse when the file is unlinked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackLink {
    Reference { target: Target, location: Location },
    Implementor { target: Declaration, implementor: Declaration },
}

/// A name occurrence in this file, for position queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub range: Range,
    pub target: Target,
    /// `true` where the name is declared, `false` where it is referred to.
    pub definition: bool,
    /// `true` when recorded by Link (dropped on unlink).
    pub linked: bool,
}

/// Namespace and imports in effect for one top-level declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclScope {
    pub space: SpaceId,
    pub imports: Vec<SpaceRef>,
}

/// One source document and everything compiled from it.
#[derive(Debug, Clone)]
pub struct FileUnit {
    pub syntax: FileSyntax,
    pub library: LibraryId,
    /// Top-level declarations in Tidy traversal order.
    pub declarations: Vec<Declaration>,
    /// Namespaces this file opened, parents before children.
    pub spaces: Vec<SpaceId>,
    /// Aligned with `declarations`; filled by [`crate::link_imports`].
    pub scopes: Vec<DeclScope>,
    pub links: Vec<BackLink>,
    pub occurrences: Vec<Occurrence>,
    pub diagnostics: Diagnostics,
}

impl FileUnit {
    pub fn new(syntax: FileSyntax, library: LibraryId) -> Self {
        Self {
            syntax,
            library,
            declarations: vec![],
            spaces: vec![],
            scopes: vec![],
            links: vec![],
            occurrences: vec![],
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.syntax.path
    }

    pub(crate) fn occur(&mut self, range: Range, target: Target, definition: bool, linked: bool) {
        self.occurrences.push(Occurrence {
            range,
            target,
            definition,
            linked,
        });
    }
}
