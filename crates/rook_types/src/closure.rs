//! Interface and class implementation closure.
//!
//! Links are computed against a shared borrow and applied afterwards, so
//! nothing reads `overrides`/`implements` while the pass is still running.

use std::collections::HashSet;

use rook_model::{
    AbstractDeclaration, Category, Declaration, Diagnostic, DiagnosticCode, LibraryId, LibrarySet,
};

use crate::check::Report;

/// Override and implements links found by the closure pass.
#[derive(Debug, Default)]
pub(crate) struct Relations {
    /// `(derived, base)`
    overrides: Vec<(Declaration, Declaration)>,
    /// `(class function, interface function)`
    implements: Vec<(Declaration, Declaration)>,
}

impl Relations {
    /// Write both directions into records of `library`; a foreign end
    /// only gets its forward half from this side.
    pub(crate) fn apply(self, libraries: &mut LibrarySet, library: LibraryId) {
        for (derived, base) in self.overrides {
            if derived.library == library {
                if let Some(callable) = libraries
                    .declaration_mut(&derived)
                    .and_then(|record| record.callable_mut())
                {
                    push_unique(&mut callable.overrides, base);
                }
            }
            if base.library == library {
                if let Some(callable) = libraries
                    .declaration_mut(&base)
                    .and_then(|record| record.callable_mut())
                {
                    push_unique(&mut callable.overridden_by, derived);
                }
            }
        }
        for (function, interface_fn) in self.implements {
            if function.library == library {
                if let Some(callable) = libraries
                    .declaration_mut(&function)
                    .and_then(|record| record.callable_mut())
                {
                    push_unique(&mut callable.implements, interface_fn);
                }
            }
            if interface_fn.library == library {
                if let Some(callable) = libraries
                    .declaration_mut(&interface_fn)
                    .and_then(|record| record.callable_mut())
                {
                    push_unique(&mut callable.implemented_by, function);
                }
            }
        }
    }
}

fn push_unique(list: &mut Vec<Declaration>, declaration: Declaration) {
    if !list.contains(&declaration) {
        list.push(declaration);
    }
}

/// Transitive closure of the interfaces `interface` inherits, in DFS
/// order, excluding `interface` itself. The flag is set when the walk
/// comes back around to `interface`.
pub(crate) fn interface_closure(
    libraries: &LibrarySet,
    roots: &[Declaration],
    start: Option<&Declaration>,
) -> (Vec<Declaration>, bool) {
    let mut seen = HashSet::new();
    let mut order = vec![];
    let mut circular = false;
    let mut stack: Vec<Declaration> = roots.iter().rev().copied().collect();
    while let Some(next) = stack.pop() {
        if Some(&next) == start {
            circular = true;
            continue;
        }
        if !seen.insert(next) {
            continue;
        }
        order.push(next);
        if let Some(info) = libraries.declaration(&next).and_then(|r| r.as_interface()) {
            stack.extend(info.inherits.iter().rev().filter_map(|ty| ty.declaration()));
        }
    }
    (order, circular)
}

/// Whether following `parent` from `class` leads back to `class`.
fn parent_chain_loops(libraries: &LibrarySet, class: &Declaration) -> bool {
    let mut seen = HashSet::new();
    let mut current = *class;
    while let Some(parent) = libraries
        .declaration(&current)
        .and_then(|record| record.as_class())
        .and_then(|info| info.parent)
        .and_then(|ty| ty.declaration())
    {
        if parent == *class {
            return true;
        }
        if !seen.insert(parent) {
            return false;
        }
        current = parent;
    }
    false
}

fn circular(record: &AbstractDeclaration) -> Diagnostic {
    Diagnostic::error(
        record.name_range,
        DiagnosticCode::CircularInheritance,
        format!("`{}` inherits from itself", record.name),
    )
}

fn display_name(libraries: &LibrarySet, record: &AbstractDeclaration) -> String {
    libraries
        .full_name(&record.declaration)
        .unwrap_or_else(|| record.name.clone())
}

/// Valid member functions with a fully resolved signature.
fn linked_functions(record: &AbstractDeclaration) -> impl Iterator<Item = &AbstractDeclaration> {
    record.functions().iter().filter(|function| {
        function.valid
            && function
                .callable()
                .is_some_and(|callable| callable.signature.is_resolved())
    })
}

/// Same name, same parameter signature.
fn same_signature(a: &AbstractDeclaration, b: &AbstractDeclaration) -> bool {
    match (a.callable(), b.callable()) {
        (Some(x), Some(y)) => a.name == b.name && x.signature == y.signature,
        _ => false,
    }
}

fn same_returns(a: &AbstractDeclaration, b: &AbstractDeclaration) -> bool {
    match (a.callable(), b.callable()) {
        (Some(x), Some(y)) => x.returns == y.returns,
        _ => true,
    }
}

fn return_mismatch(
    libraries: &LibrarySet,
    function: &AbstractDeclaration,
    base: &AbstractDeclaration,
) -> Diagnostic {
    let base_name = display_name(libraries, base);
    Diagnostic::error(
        function.name_range,
        DiagnosticCode::ReturnTypeMismatch,
        format!(
            "`{}` has the parameters of `{}` but a different return type",
            function.name, base_name
        ),
    )
    .with_related(base.location(), format!("`{}` declared here", base_name))
}

/// For each interface of `library`: functions redeclared from an
/// inherited interface must keep the inherited return types.
pub(crate) fn check_interfaces(
    libraries: &LibrarySet,
    library: LibraryId,
    relations: &mut Relations,
    report: &mut Report,
) {
    let Some(lib) = libraries.get(library) else {
        return;
    };
    for interface in lib.iter(Category::Interface).filter(|r| r.valid) {
        let Some(info) = interface.as_interface() else {
            continue;
        };
        let roots: Vec<Declaration> = info.inherits.iter().filter_map(|ty| ty.declaration()).collect();
        let (closure, looped) = interface_closure(libraries, &roots, Some(&interface.declaration));
        if looped {
            report.push(&interface.document, circular(interface));
        }
        let inherited: Vec<&AbstractDeclaration> = closure
            .iter()
            .filter_map(|base| libraries.declaration(base))
            .flat_map(linked_functions)
            .collect();

        for function in linked_functions(interface) {
            let mut reported = false;
            for base in inherited.iter().filter(|base| same_signature(function, base)) {
                relations.overrides.push((function.declaration, base.declaration));
                if !reported && !same_returns(function, base) {
                    report.push(&function.document, return_mismatch(libraries, function, base));
                    reported = true;
                }
            }
        }
    }
}

/// For each class of `library`: link overrides along the parent chain,
/// link implementations of every interface in the inherited closure and
/// report the interface functions the class leaves unimplemented.
pub(crate) fn check_classes(
    libraries: &LibrarySet,
    library: LibraryId,
    relations: &mut Relations,
    report: &mut Report,
) {
    let Some(lib) = libraries.get(library) else {
        return;
    };
    for class in lib.iter(Category::Class).filter(|r| r.valid) {
        let Some(info) = class.as_class() else {
            continue;
        };
        if parent_chain_loops(libraries, &class.declaration) {
            report.push(&class.document, circular(class));
        }

        // Every ancestor is scanned, so a mismatch is reported per level.
        let ancestors = rook_resolve::class_ancestors(libraries, &class.declaration);
        for function in linked_functions(class) {
            for ancestor in ancestors.iter().filter_map(|a| libraries.declaration(a)) {
                for base in linked_functions(ancestor).filter(|base| same_signature(function, base)) {
                    relations.overrides.push((function.declaration, base.declaration));
                    if !same_returns(function, base) {
                        report.push(&function.document, return_mismatch(libraries, function, base));
                    }
                }
            }
        }

        let roots: Vec<Declaration> = info.inherits.iter().filter_map(|ty| ty.declaration()).collect();
        let (closure, _) = interface_closure(libraries, &roots, None);
        let mut missing: Vec<&AbstractDeclaration> = vec![];
        for interface in closure.iter().filter_map(|i| libraries.declaration(i)) {
            for required in interface.functions().iter().filter(|f| f.valid) {
                let resolved = required
                    .callable()
                    .is_some_and(|callable| callable.signature.is_resolved());
                if !resolved {
                    continue;
                }
                let implementation = class.functions().iter().find(|own| {
                    own.name == required.name
                        && own.callable().is_some_and(|callable| {
                            !callable.signature.is_resolved() || same_signature(own, required)
                        })
                });
                match implementation {
                    Some(own) if own.valid && same_signature(own, required) => {
                        relations.implements.push((own.declaration, required.declaration));
                        if !same_returns(own, required) {
                            report.push(&own.document, return_mismatch(libraries, own, required));
                        }
                    }
                    Some(_) => {}
                    None => missing.push(required),
                }
            }
        }

        if !missing.is_empty() {
            let names: Vec<String> = missing
                .iter()
                .map(|function| format!("`{}`", display_name(libraries, function)))
                .collect();
            let mut diagnostic = Diagnostic::error(
                class.name_range,
                DiagnosticCode::NotImplemented,
                format!(
                    "`{}` does not implement interface functions: {}",
                    class.name,
                    names.join(", ")
                ),
            );
            for function in missing {
                diagnostic = diagnostic.with_related(
                    function.location(),
                    format!("`{}` declared here", display_name(libraries, function)),
                );
            }
            report.push(&class.document, diagnostic);
        }
    }
}
