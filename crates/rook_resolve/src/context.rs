//! Lookup scopes and name resolution.

use indexmap::IndexSet;
use rook_model::{Category, Declaration, Diagnostic, LibrarySet, SpaceRef};
use rook_syntax::{Ident, Range};

use crate::errors::{ambiguous, not_accessible, not_found, suggest};
use crate::visibility::class_ancestors;

/// A resolved lookup scope.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub libraries: &'a LibrarySet,
    /// Path of the document being compiled.
    pub document: &'a str,
    /// Current namespace.
    pub space: SpaceRef,
    /// Imported namespaces, in directive order.
    pub imports: &'a [SpaceRef],
    /// Enclosing declaration, if any (a struct or class for member lookups).
    pub declaration: Option<Declaration>,
    /// Attach "did you mean" hints to not-found diagnostics.
    pub suggestions: bool,
}

/// Outcome of a dotted lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolution {
    /// Each namespace segment that resolved, with the range naming it.
    pub spaces: Vec<(Range, SpaceRef)>,
    pub declarations: Vec<Declaration>,
}

impl<'a> Context<'a> {
    pub fn new(libraries: &'a LibrarySet, document: &'a str, space: SpaceRef) -> Self {
        Self {
            libraries,
            document,
            space,
            imports: &[],
            declaration: None,
            suggestions: true,
        }
    }

    pub fn with_imports(mut self, imports: &'a [SpaceRef]) -> Self {
        self.imports = imports;
        self
    }

    pub fn within(mut self, declaration: Option<Declaration>) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn with_suggestions(mut self, suggestions: bool) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Namespaces enclosing the current one, nearest first.
    fn enclosing(&self) -> Vec<SpaceRef> {
        match self.libraries.get(self.space.library) {
            Some(lib) => lib
                .spaces
                .ancestors(self.space.space)
                .into_iter()
                .map(|space| SpaceRef::new(self.space.library, space))
                .collect(),
            None => vec![],
        }
    }

    /// Imports followed by the kernel root, which every library sees.
    fn import_scopes(&self) -> Vec<SpaceRef> {
        let mut scopes: Vec<SpaceRef> = self.imports.to_vec();
        if let Some(kernel) = self.libraries.root(rook_model::LibraryId::KERNEL) {
            if !scopes.contains(&kernel) {
                scopes.push(kernel);
            }
        }
        scopes
    }

    fn child(&self, parent: SpaceRef, name: &str) -> Option<SpaceRef> {
        let lib = self.libraries.get(parent.library)?;
        let child = lib.spaces.find_child(parent.space, name)?;
        Some(SpaceRef::new(parent.library, child))
    }

    // ---- Namespaces ----

    /// Resolve the leading segment of a dotted name to a namespace.
    ///
    /// The nearest enclosing namespace with a matching child wins. Failing
    /// that, matches are gathered across imports, library names and the
    /// kernel; more than one is ambiguous and the first is used.
    pub fn find_space(&self, name: &Ident, diagnostics: &mut Vec<Diagnostic>) -> Option<SpaceRef> {
        for scope in self.enclosing() {
            if let Some(found) = self.child(scope, &name.name) {
                return Some(found);
            }
        }

        let mut candidates: IndexSet<SpaceRef> = IndexSet::new();
        for scope in self.imports {
            if let Some(found) = self.child(*scope, &name.name) {
                candidates.insert(found);
            }
        }
        if let Some(library) = self.libraries.by_name(&name.name) {
            if let Some(root) = self.libraries.root(library) {
                candidates.insert(root);
            }
        }
        if let Some(kernel) = self.libraries.root(rook_model::LibraryId::KERNEL) {
            if let Some(found) = self.child(kernel, &name.name) {
                candidates.insert(found);
            }
        }

        if candidates.len() > 1 {
            let described: Vec<_> = candidates
                .iter()
                .map(|space| self.describe_space(*space))
                .collect();
            diagnostics.push(ambiguous(name, &described));
        }
        candidates.first().copied()
    }

    fn describe_space(&self, space: SpaceRef) -> (String, Option<rook_syntax::Location>) {
        let Some(lib) = self.libraries.get(space.library) else {
            return (String::new(), None);
        };
        let full = lib.spaces.full_name(space.space);
        let full = if full.is_empty() {
            lib.name.clone()
        } else {
            format!("{}.{}", lib.name, full)
        };
        let location = lib
            .spaces
            .get(space.space)
            .and_then(|node| node.references.first().cloned());
        (full, location)
    }

    // ---- Declarations ----

    /// Resolve a simple name.
    ///
    /// Inside a struct or class its members are searched first (walking
    /// the parent chain for classes) and any match hides the namespaces
    /// entirely. Otherwise the enclosing namespaces are searched nearest
    /// first, then imports; the first non-empty visible group wins.
    pub fn find_declaration(&self, name: &Ident, diagnostics: &mut Vec<Diagnostic>) -> Vec<Declaration> {
        let members = self.find_member(&name.name);
        if !members.is_empty() {
            return members;
        }

        let mut hidden = false;
        let scopes = self.enclosing().into_iter().chain(self.import_scopes());
        for scope in scopes {
            let Some(space) = self.libraries.space(scope) else {
                continue;
            };
            let group = space.lookup(&name.name);
            if group.is_empty() {
                continue;
            }
            let visible = self.visible(group);
            if !visible.is_empty() {
                return visible;
            }
            hidden = true;
        }

        if hidden {
            diagnostics.push(not_accessible(name));
        } else {
            let suggestion = if self.suggestions {
                let names = self.names_in_scope();
                let names: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                suggest(&name.name, &names)
            } else {
                None
            };
            diagnostics.push(not_found(name, "declaration", suggestion));
        }
        vec![]
    }

    /// Visible members named `name` of the enclosing struct or class, or of
    /// the nearest ancestor class that has any.
    fn find_member(&self, name: &str) -> Vec<Declaration> {
        let Some(enclosing) = self.declaration else {
            return vec![];
        };
        if !matches!(enclosing.category, Category::Struct | Category::Class) {
            return vec![];
        }
        let mut levels = vec![enclosing];
        if enclosing.category == Category::Class {
            levels.extend(class_ancestors(self.libraries, &enclosing));
        }
        for level in levels {
            let Some(record) = self.libraries.declaration(&level) else {
                continue;
            };
            let visible = self.visible(&record.members_named(name));
            if !visible.is_empty() {
                return visible;
            }
        }
        vec![]
    }

    /// Resolve a possibly dotted name. The leading segment goes through
    /// [`Context::find_space`]; later namespace segments must match exactly.
    pub fn find_declaration_path(
        &self,
        path: &[Ident],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> PathResolution {
        let mut resolution = PathResolution::default();
        let Some((last, prefix)) = path.split_last() else {
            return resolution;
        };
        let Some((first, rest)) = prefix.split_first() else {
            resolution.declarations = self.find_declaration(last, diagnostics);
            return resolution;
        };

        let Some(mut space) = self.find_space(first, diagnostics) else {
            diagnostics.push(not_found(first, "namespace", None));
            return resolution;
        };
        resolution.spaces.push((first.range, space));
        for segment in rest {
            match self.child(space, &segment.name) {
                Some(child) => {
                    space = child;
                    resolution.spaces.push((segment.range, space));
                }
                None => {
                    diagnostics.push(not_found(segment, "namespace", None));
                    return resolution;
                }
            }
        }

        let group = self
            .libraries
            .space(space)
            .map(|node| node.lookup(&last.name).to_vec())
            .unwrap_or_default();
        let visible = self.visible(&group);
        if visible.is_empty() {
            if group.is_empty() {
                diagnostics.push(not_found(last, "declaration", None));
            } else {
                diagnostics.push(not_accessible(last));
            }
        }
        resolution.declarations = visible;
        resolution
    }

    /// Operator-overload lookup: the union of the kernel, every enclosing
    /// namespace and every import, deduplicated.
    pub fn find_operation(&self, name: &str) -> Vec<Declaration> {
        let mut found: IndexSet<Declaration> = IndexSet::new();
        let kernel = self.libraries.root(rook_model::LibraryId::KERNEL);
        let scopes = kernel
            .into_iter()
            .chain(self.enclosing())
            .chain(self.imports.iter().copied());
        for scope in scopes {
            if let Some(space) = self.libraries.space(scope) {
                found.extend(self.visible(space.lookup(name)));
            }
        }
        found.into_iter().collect()
    }

    fn visible(&self, group: &[Declaration]) -> Vec<Declaration> {
        group
            .iter()
            .filter(|decl| self.is_visible(decl))
            .copied()
            .collect()
    }

    /// Names a simple lookup could reach, for suggestions.
    fn names_in_scope(&self) -> Vec<String> {
        let mut names: IndexSet<String> = IndexSet::new();
        for scope in self.enclosing().into_iter().chain(self.import_scopes()) {
            if let Some(space) = self.libraries.space(scope) {
                let reachable = space
                    .declarations
                    .iter()
                    .filter(|(_, group)| !self.visible(group).is_empty())
                    .map(|(name, _)| name.clone());
                names.extend(reachable);
            }
        }
        names.into_iter().collect()
    }
}
