//! Tidy phase and whole-file teardown.
//!
//! Tidy gives every top-level declaration of one file a stable identity
//! and a place in the namespace tree. Teardown undoes that in two steps:
//! [`mark`] strips everything the file wrote into other records and
//! returns its indices to the allocator, then [`dispose`] detaches its
//! declarations and namespaces from the tree.

use rook_model::{
    AbstractDeclaration, Category, Declaration, Diagnostic, DiagnosticCode, Fault, IndexAllocator,
    LibrarySet, Phase, SpaceId,
};
use rook_syntax::{DeclNode, SpaceNode};
use tracing::{debug, trace};

use crate::linker::unlink;
use crate::names::{is_identifier, is_operator};
use crate::unit::{FileUnit, Target};

/// Category a top-level syntax node occupies.
pub fn category_of(node: &DeclNode) -> Category {
    match node {
        DeclNode::Variable(_) => Category::Variable,
        DeclNode::Function(_) => Category::Function,
        DeclNode::Native(_) => Category::Native,
        DeclNode::Enum(_) => Category::Enum,
        DeclNode::Struct(_) => Category::Struct,
        DeclNode::Interface(_) => Category::Interface,
        DeclNode::Class(_) => Category::Class,
        DeclNode::Delegate(_) => Category::Delegate,
        DeclNode::Task(_) => Category::Task,
    }
}

/// Allocate identities for every top-level declaration of `unit`.
pub fn tidy(
    libraries: &mut LibrarySet,
    allocator: &mut IndexAllocator,
    unit: &mut FileUnit,
) -> Result<(), Fault> {
    unit.diagnostics.clear(Phase::Tidy);
    let syntax = unit.syntax.clone();
    let root = match libraries.get(unit.library) {
        Some(lib) => lib.spaces.root(),
        None => return Ok(()),
    };
    tidy_space(libraries, allocator, unit, &syntax.root, root)?;
    debug!(
        path = unit.path(),
        library = %unit.library,
        declarations = unit.declarations.len(),
        "tidied file"
    );
    Ok(())
}

fn tidy_space(
    libraries: &mut LibrarySet,
    allocator: &mut IndexAllocator,
    unit: &mut FileUnit,
    node: &SpaceNode,
    space: SpaceId,
) -> Result<(), Fault> {
    let library = unit.library;

    // Child namespaces first, then this level's declarations.
    for child in &node.children {
        let Some(name) = &child.name else {
            tidy_space(libraries, allocator, unit, child, space)?;
            continue;
        };
        let Some(lib) = libraries.get_mut(library) else {
            return Ok(());
        };
        let id = lib.spaces.child(space, &name.name);
        if let Some(node) = lib.spaces.get_mut(id) {
            node.documents.insert(unit.syntax.path.clone());
        }
        if !unit.spaces.contains(&id) {
            unit.spaces.push(id);
        }
        let target = Target::Space(rook_model::SpaceRef::new(library, id));
        unit.occur(name.range, target, true, false);
        tidy_space(libraries, allocator, unit, child, id)?;
    }

    for node in &node.declarations {
        let category = category_of(node);
        let name = node.name();
        let Some(lib) = libraries.get_mut(library) else {
            return Ok(());
        };
        let index = match allocator.allocate(library, category)? {
            Some(index) => index,
            None => lib.table_len(category),
        };
        trace!(name = %name.name, ?category, index, "allocated declaration");

        let id = Declaration::new(library, category, index, node.visibility());
        let mut record = AbstractDeclaration::new(name, &unit.syntax.path, space, id);
        let operator = matches!(category, Category::Function | Category::Native)
            && is_operator(&name.name);
        if !operator && !is_identifier(&name.name) {
            record.valid = false;
            unit.diagnostics.push(
                Phase::Tidy,
                Diagnostic::error(
                    name.range,
                    DiagnosticCode::InvalidIdentifier,
                    format!("`{}` is not a valid name", name.name),
                ),
            );
        }
        lib.insert(record)?;
        lib.spaces.declare(space, &name.name, id);
        unit.declarations.push(id);
        unit.occur(name.range, Target::Declaration(id), true, false);
    }
    Ok(())
}

/// First half of teardown: strip every back-link the file contributed or
/// that other records hold into it, and recycle its indices.
pub fn mark(
    libraries: &mut LibrarySet,
    allocator: &mut IndexAllocator,
    unit: &mut FileUnit,
) -> Result<(), Fault> {
    for id in unit.declarations.clone() {
        strip_relations(libraries, &id);
    }
    unlink(libraries, unit);
    for id in &unit.declarations {
        allocator.recycle(id.library, id.category, id.index)?;
    }
    debug!(path = unit.path(), recycled = unit.declarations.len(), "marked file");
    Ok(())
}

/// Second half of teardown: detach the file's declarations and namespaces.
pub fn dispose(libraries: &mut LibrarySet, unit: &mut FileUnit) {
    let Some(lib) = libraries.get_mut(unit.library) else {
        return;
    };
    for id in unit.declarations.drain(..) {
        if let Some(record) = lib.remove(&id) {
            lib.spaces.undeclare(record.space, &record.name, &id);
        }
    }
    for space in unit.spaces.drain(..).rev() {
        if let Some(node) = lib.spaces.get_mut(space) {
            node.documents.remove(&unit.syntax.path);
        }
        lib.spaces.prune(space);
    }
    unit.occurrences.clear();
    unit.scopes.clear();
    unit.diagnostics = rook_model::Diagnostics::new();
}

/// Remove override/implements links that point at `declaration`'s member
/// functions from the records on the other end.
fn strip_relations(libraries: &mut LibrarySet, declaration: &Declaration) {
    let Some(record) = libraries.declaration(declaration) else {
        return;
    };
    let mut pending = vec![];
    for function in record.functions() {
        if let Some(callable) = function.callable() {
            let others = callable
                .overrides
                .iter()
                .chain(&callable.overridden_by)
                .chain(&callable.implements)
                .chain(&callable.implemented_by);
            for other in others {
                pending.push((*other, function.declaration));
            }
        }
    }
    for (other, gone) in pending {
        if let Some(callable) = libraries
            .declaration_mut(&other)
            .and_then(|record| record.callable_mut())
        {
            callable.overrides.retain(|d| *d != gone);
            callable.overridden_by.retain(|d| *d != gone);
            callable.implements.retain(|d| *d != gone);
            callable.implemented_by.retain(|d| *d != gone);
        }
    }
}
