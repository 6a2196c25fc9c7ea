//! Link phase — member declarations, imports, inheritance and type
//! references.
//!
//! Each step first computes its results against a shared borrow of the
//! libraries, then applies them. Steps run across every file before the
//! next step starts, so cross-file lookups always see identity-stable
//! top-level declarations and fully linked parent chains.

use rook_model::{
    AbstractDeclaration, Category, DeclKind, Declaration, Diagnostic, DiagnosticCode, LibraryId,
    LibrarySet, Parameter, Phase, SpaceId, SpaceRef, TaskInfo, Tuple, Type, TypeCode, Variable,
};
use rook_resolve::Context;
use rook_syntax::{
    DeclNode, FunctionNode, Ident, ImportNode, Location, ParamNode, Range, SpaceNode, TypeRef,
    Visibility,
};
use tracing::debug;

use crate::names::is_identifier;
use crate::unit::{BackLink, DeclScope, FileUnit, Target};

/// Knobs for the Link phase.
#[derive(Debug, Clone, Copy)]
pub struct LinkOptions {
    /// Attach "did you mean" hints to not-found diagnostics.
    pub suggestions: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self { suggestions: true }
    }
}

/// Top-level declaration nodes in Tidy traversal order: child namespaces
/// first, then the current level.
pub fn declaration_nodes(root: &SpaceNode) -> Vec<&DeclNode> {
    fn walk<'a>(node: &'a SpaceNode, out: &mut Vec<&'a DeclNode>) {
        for child in &node.children {
            walk(child, out);
        }
        out.extend(node.declarations.iter());
    }
    let mut out = vec![];
    walk(root, &mut out);
    out
}

// ---- Results computed before they are applied ----

#[derive(Debug)]
enum Update {
    Variable {
        target: Declaration,
        ty: Type,
        constant: bool,
    },
    Callable {
        target: Declaration,
        params: Vec<Parameter>,
        returns: Tuple,
    },
    Task {
        target: Declaration,
        returns: Tuple,
    },
    Inheritance {
        target: Declaration,
        parent: Option<Type>,
        inherits: Vec<Type>,
    },
}

#[derive(Debug, Default)]
struct Output {
    diagnostics: Vec<Diagnostic>,
    references: Vec<(Target, Location)>,
    implementors: Vec<(Declaration, Declaration)>,
    updates: Vec<Update>,
}

impl Output {
    fn apply(self, libraries: &mut LibrarySet, unit: &mut FileUnit) {
        for update in self.updates {
            apply_update(libraries, update);
        }
        for (target, location) in self.references {
            let inserted = match target {
                Target::Declaration(decl) => libraries
                    .declaration_mut(&decl)
                    .map(|record| record.references.insert(location.clone())),
                Target::Space(space) => libraries
                    .space_mut(space)
                    .map(|node| node.references.insert(location.clone())),
            };
            if inserted != Some(true) {
                continue;
            }
            unit.occur(location.range, target, false, true);
            unit.links.push(BackLink::Reference { target, location });
        }
        for (target, implementor) in self.implementors {
            let Some(list) = libraries
                .declaration_mut(&target)
                .and_then(implementor_list)
            else {
                continue;
            };
            if !list.contains(&implementor) {
                list.push(implementor);
            }
            unit.links.push(BackLink::Implementor {
                target,
                implementor,
            });
        }
        for diagnostic in self.diagnostics {
            unit.diagnostics.push(Phase::Link, diagnostic);
        }
    }
}

fn implementor_list(record: &mut AbstractDeclaration) -> Option<&mut Vec<Declaration>> {
    match &mut record.kind {
        DeclKind::Class(class) => Some(&mut class.implementors),
        DeclKind::Interface(interface) => Some(&mut interface.implementors),
        _ => None,
    }
}

fn apply_update(libraries: &mut LibrarySet, update: Update) {
    match update {
        Update::Variable {
            target,
            ty,
            constant,
        } => {
            if let Some(record) = libraries.declaration_mut(&target) {
                record.kind = DeclKind::Variable(Variable { ty, constant });
            }
        }
        Update::Callable {
            target,
            params,
            returns,
        } => {
            if let Some(callable) = libraries
                .declaration_mut(&target)
                .and_then(|record| record.callable_mut())
            {
                callable.signature = params.iter().map(|p| p.ty).collect();
                callable.params = params;
                callable.returns = returns;
            }
        }
        Update::Task { target, returns } => {
            if let Some(record) = libraries.declaration_mut(&target) {
                record.kind = DeclKind::Task(TaskInfo { returns });
            }
        }
        Update::Inheritance {
            target,
            parent,
            inherits,
        } => match libraries.declaration_mut(&target).map(|record| &mut record.kind) {
            Some(DeclKind::Class(class)) => {
                class.parent = parent;
                class.inherits = inherits;
            }
            Some(DeclKind::Interface(interface)) => {
                interface.inherits = inherits;
            }
            _ => {}
        },
    }
}

// ---- Type resolution ----

/// Resolution state for one file.
struct Pass<'a> {
    libraries: &'a LibrarySet,
    path: &'a str,
    library: LibraryId,
    options: LinkOptions,
    out: Output,
}

impl<'a> Pass<'a> {
    fn new(libraries: &'a LibrarySet, unit: &'a FileUnit, options: LinkOptions) -> Self {
        Self {
            libraries,
            path: unit.path(),
            library: unit.library,
            options,
            out: Output::default(),
        }
    }

    fn context(&self, scope: &'a DeclScope, within: Option<Declaration>) -> Context<'a> {
        Context::new(self.libraries, self.path, SpaceRef::new(self.library, scope.space))
            .with_imports(&scope.imports)
            .within(within)
            .with_suggestions(self.options.suggestions)
    }

    fn reference(&mut self, target: Target, range: Range) {
        self.out
            .references
            .push((target, Location::new(self.path, range)));
    }

    /// Resolve a syntactic type reference. Anything but exactly one
    /// type-defining match yields [`Type::INVALID`].
    fn resolve_type(&mut self, ctx: &Context<'_>, ty: &TypeRef) -> Type {
        let resolution = ctx.find_declaration_path(&ty.path, &mut self.out.diagnostics);
        for (range, space) in &resolution.spaces {
            self.reference(Target::Space(*space), *range);
        }
        let Some(name) = ty.name() else {
            return Type::INVALID;
        };
        match resolution.declarations.as_slice() {
            [] => Type::INVALID,
            [declaration] => {
                self.reference(Target::Declaration(*declaration), name.range);
                let defining = defining_type(declaration);
                if defining.is_invalid() {
                    self.out.diagnostics.push(Diagnostic::error(
                        ty.range,
                        DiagnosticCode::NotAType,
                        format!(
                            "`{}` is a {}, not a type",
                            ty.dotted(),
                            declaration.category.keyword()
                        ),
                    ));
                    return Type::INVALID;
                }
                defining.with_dimension(ty.dimension)
            }
            many => {
                let mut diagnostic = Diagnostic::error(
                    ty.range,
                    DiagnosticCode::Ambiguous,
                    format!("`{}` matches {} declarations", ty.dotted(), many.len()),
                );
                for candidate in many {
                    if let Some(record) = self.libraries.declaration(candidate) {
                        diagnostic = diagnostic.with_related(record.location(), "candidate");
                    }
                }
                self.out.diagnostics.push(diagnostic);
                Type::INVALID
            }
        }
    }

    fn resolve_types(&mut self, ctx: &Context<'_>, types: &[TypeRef]) -> Tuple {
        types.iter().map(|ty| self.resolve_type(ctx, ty)).collect()
    }

    fn resolve_params(&mut self, ctx: &Context<'_>, params: &[ParamNode]) -> Vec<Parameter> {
        params
            .iter()
            .map(|param| Parameter {
                name: param.name.as_ref().map(|n| n.name.clone()),
                ty: self.resolve_type(ctx, &param.ty),
            })
            .collect()
    }

    fn callable(&mut self, ctx: &Context<'_>, target: Declaration, params: &[ParamNode], returns: &[TypeRef]) {
        let params = self.resolve_params(ctx, params);
        let returns = self.resolve_types(ctx, returns);
        self.out.updates.push(Update::Callable {
            target,
            params,
            returns,
        });
    }

    fn function(&mut self, ctx: &Context<'_>, target: Declaration, node: &FunctionNode) {
        self.callable(ctx, target, &node.params, &node.returns);
    }
}

/// The type a resolved name stands for: type declarations stand for
/// themselves, struct/class/interface members for their owner.
pub fn defining_type(declaration: &Declaration) -> Type {
    match declaration.owner() {
        Some(owner) if owner.category != Category::Enum => Type::of(&owner),
        Some(_) => Type::INVALID,
        None => Type::of(declaration),
    }
}

// ---- Imports ----

/// Resolve `import a.b.c`: the first segment names a library, or a
/// namespace at the root of the importing library or the kernel; the
/// rest walk exact children.
fn resolve_import(
    libraries: &LibrarySet,
    library: LibraryId,
    import: &ImportNode,
) -> Option<Vec<(Range, SpaceRef)>> {
    let (first, rest) = import.path.split_first()?;
    let child_of = |parent: SpaceRef, name: &str| -> Option<SpaceRef> {
        let lib = libraries.get(parent.library)?;
        Some(SpaceRef::new(parent.library, lib.spaces.find_child(parent.space, name)?))
    };
    let start = libraries
        .by_name(&first.name)
        .and_then(|lib| libraries.root(lib))
        .or_else(|| child_of(libraries.root(library)?, &first.name))
        .or_else(|| child_of(libraries.root(LibraryId::KERNEL)?, &first.name))?;

    let mut resolved = vec![(first.range, start)];
    let mut current = start;
    for segment in rest {
        current = child_of(current, &segment.name)?;
        resolved.push((segment.range, current));
    }
    Some(resolved)
}

/// Resolve the file's import directives and record, for every top-level
/// declaration, the namespace and imports it is linked in.
pub fn link_imports(libraries: &mut LibrarySet, unit: &mut FileUnit) {
    unit.scopes.clear();
    let mut scopes = vec![];
    let mut out = Output::default();
    if let Some(root) = libraries.get(unit.library).map(|lib| lib.spaces.root()) {
        walk_imports(
            libraries,
            unit.library,
            &unit.syntax.root,
            root,
            &[],
            &mut scopes,
            &mut out,
            unit.path(),
        );
    }
    unit.scopes = scopes;
    out.apply(libraries, unit);
}

#[allow(clippy::too_many_arguments)]
fn walk_imports(
    libraries: &LibrarySet,
    library: LibraryId,
    node: &SpaceNode,
    space: SpaceId,
    inherited: &[SpaceRef],
    scopes: &mut Vec<DeclScope>,
    out: &mut Output,
    path: &str,
) {
    let mut imports = inherited.to_vec();
    for import in &node.imports {
        match resolve_import(libraries, library, import) {
            Some(segments) => {
                for (range, space) in &segments {
                    out.references
                        .push((Target::Space(*space), Location::new(path, *range)));
                }
                if let Some((_, last)) = segments.last() {
                    if !imports.contains(last) {
                        imports.push(*last);
                    }
                }
            }
            None => {
                let dotted = import
                    .path
                    .iter()
                    .map(|ident| ident.name.as_str())
                    .collect::<Vec<_>>()
                    .join(".");
                out.diagnostics.push(Diagnostic::error(
                    import.range,
                    DiagnosticCode::ImportNotFound,
                    format!("cannot find import `{}`", dotted),
                ));
            }
        }
    }

    for child in &node.children {
        let child_space = match &child.name {
            Some(name) => libraries
                .get(library)
                .and_then(|lib| lib.spaces.find_child(space, &name.name)),
            None => Some(space),
        };
        if let Some(child_space) = child_space {
            walk_imports(libraries, library, child, child_space, &imports, scopes, out, path);
        }
    }
    for _ in &node.declarations {
        scopes.push(DeclScope {
            space,
            imports: imports.clone(),
        });
    }
}

// ---- Members ----

fn member_name_diagnostic(name: &str, range: Range) -> Diagnostic {
    Diagnostic::error(
        range,
        DiagnosticCode::InvalidIdentifier,
        format!("`{}` is not a valid member name", name),
    )
}

/// Create the member declarations of every top-level declaration of the
/// file. Members are positional: index is the position in the owner's
/// list and `define` the owner's index.
pub fn declare_members(libraries: &mut LibrarySet, unit: &mut FileUnit) {
    let path = unit.syntax.path.clone();
    let nodes = declaration_nodes(&unit.syntax.root);
    let mut diagnostics = vec![];
    let mut definitions = vec![];

    for (owner, node) in unit.declarations.iter().zip(nodes) {
        let Some(record) = libraries.declaration_mut(owner) else {
            continue;
        };
        let space = record.space;
        let member = |category: Category, index: usize, name: &Ident, visibility: Visibility| {
            let id = Declaration::member(owner.library, category, index as u32, owner.index, visibility);
            AbstractDeclaration::new(name, &path, space, id)
        };

        let mut created: Vec<AbstractDeclaration> = vec![];
        match node {
            DeclNode::Enum(e) => {
                for (i, element) in e.elements.iter().enumerate() {
                    created.push(member(Category::EnumElement, i, element, Visibility::Public));
                }
            }
            DeclNode::Struct(s) => {
                for (i, var) in s.variables.iter().enumerate() {
                    created.push(member(Category::StructVariable, i, &var.name, var.visibility));
                }
                for (i, func) in s.functions.iter().enumerate() {
                    created.push(member(Category::StructFunction, i, &func.name, func.visibility));
                }
            }
            DeclNode::Interface(iface) => {
                for (i, func) in iface.functions.iter().enumerate() {
                    created.push(member(Category::InterfaceFunction, i, &func.name, Visibility::Public));
                }
            }
            DeclNode::Class(c) => {
                for (i, var) in c.variables.iter().enumerate() {
                    created.push(member(Category::ClassVariable, i, &var.name, var.visibility));
                }
                for (i, ctor) in c.constructors.iter().enumerate() {
                    created.push(member(Category::Constructor, i, &ctor.name, ctor.visibility));
                }
                for (i, func) in c.functions.iter().enumerate() {
                    created.push(member(Category::ClassFunction, i, &func.name, func.visibility));
                }
            }
            _ => {}
        }

        for mut member in created {
            let category = member.category();
            if category != Category::Constructor && !is_identifier(&member.name) {
                member.valid = false;
                diagnostics.push(member_name_diagnostic(&member.name, member.name_range));
            } else if category == Category::ClassFunction && member.name == record.name {
                member.valid = false;
                diagnostics.push(Diagnostic::error(
                    member.name_range,
                    DiagnosticCode::MemberNamedAfterClass,
                    format!("member function cannot share the class name `{}`", record.name),
                ));
            }
            definitions.push((member.name_range, member.declaration));
            if let Some(list) = record.members_mut(category) {
                list.push(member);
            }
        }
    }

    for (range, declaration) in definitions {
        unit.occur(range, Target::Declaration(declaration), true, true);
    }
    for diagnostic in diagnostics {
        unit.diagnostics.push(Phase::Link, diagnostic);
    }
}

// ---- Inheritance ----

/// Resolve interface and class inheritance lists and register each
/// resolved base's back-link to its implementor.
pub fn link_inheritance(libraries: &mut LibrarySet, unit: &mut FileUnit, options: LinkOptions) {
    let out = {
        let mut pass = Pass::new(libraries, unit, options);
        let nodes = declaration_nodes(&unit.syntax.root);
        for ((id, node), scope) in unit.declarations.iter().zip(nodes).zip(&unit.scopes) {
            let ctx = pass.context(scope, None);
            match node {
                DeclNode::Interface(iface) => {
                    let mut inherits = vec![];
                    for entry in &iface.inherits {
                        let ty = pass.resolve_type(&ctx, entry);
                        if ty.is_invalid() {
                            continue;
                        }
                        if ty.code == TypeCode::Interface && !ty.is_array() {
                            inherits.push(ty);
                            if let Some(base) = ty.declaration() {
                                pass.out.implementors.push((base, *id));
                            }
                        } else {
                            pass.out.diagnostics.push(Diagnostic::error(
                                entry.range,
                                DiagnosticCode::InvalidInheritance,
                                format!("interface can only inherit interfaces, `{}` is not one", entry),
                            ));
                        }
                    }
                    pass.out.updates.push(Update::Inheritance {
                        target: *id,
                        parent: None,
                        inherits,
                    });
                }
                DeclNode::Class(class) => {
                    let mut parent = None;
                    let mut inherits = vec![];
                    for (i, entry) in class.inherits.iter().enumerate() {
                        let ty = pass.resolve_type(&ctx, entry);
                        if ty.is_invalid() {
                            continue;
                        }
                        let message = if ty.is_array() {
                            Some(format!("cannot inherit from array type `{}`", entry))
                        } else if ty.code == TypeCode::Handle && i == 0 {
                            parent = Some(ty);
                            None
                        } else if ty.code == TypeCode::Handle {
                            Some(format!("only the first inherited type may be a class, `{}` is a class", entry))
                        } else if ty.code == TypeCode::Interface {
                            inherits.push(ty);
                            None
                        } else {
                            Some(format!("`{}` is neither a class nor an interface", entry))
                        };
                        match message {
                            Some(message) => pass.out.diagnostics.push(Diagnostic::error(
                                entry.range,
                                DiagnosticCode::InvalidInheritance,
                                message,
                            )),
                            None => {
                                if let Some(base) = ty.declaration() {
                                    pass.out.implementors.push((base, *id));
                                }
                            }
                        }
                    }
                    pass.out.updates.push(Update::Inheritance {
                        target: *id,
                        parent,
                        inherits,
                    });
                }
                _ => {}
            }
        }
        pass.out
    };
    out.apply(libraries, unit);
}

// ---- Signatures ----

/// Resolve variable types, parameter and return lists of every top-level
/// declaration and member of the file.
pub fn link_signatures(libraries: &mut LibrarySet, unit: &mut FileUnit, options: LinkOptions) {
    let out = {
        let mut pass = Pass::new(libraries, unit, options);
        let nodes = declaration_nodes(&unit.syntax.root);
        for ((id, node), scope) in unit.declarations.iter().zip(nodes).zip(&unit.scopes) {
            let top = pass.context(scope, None);
            let inner = pass.context(scope, Some(*id));
            let members = |category: Category| -> Vec<Declaration> {
                libraries
                    .declaration(id)
                    .and_then(|record| record.members(category))
                    .map(|list| list.iter().map(|m| m.declaration).collect())
                    .unwrap_or_default()
            };
            match node {
                DeclNode::Variable(var) => {
                    let ty = pass.resolve_type(&top, &var.ty);
                    pass.out.updates.push(Update::Variable {
                        target: *id,
                        ty,
                        constant: var.constant,
                    });
                }
                DeclNode::Function(func) | DeclNode::Native(func) => pass.function(&top, *id, func),
                DeclNode::Delegate(d) => pass.callable(&top, *id, &d.params, &d.returns),
                DeclNode::Task(t) => {
                    let returns = pass.resolve_types(&top, &t.returns);
                    pass.out.updates.push(Update::Task {
                        target: *id,
                        returns,
                    });
                }
                DeclNode::Enum(_) => {}
                DeclNode::Struct(s) => {
                    for (var, member) in s.variables.iter().zip(members(Category::StructVariable)) {
                        let ty = pass.resolve_type(&inner, &var.ty);
                        pass.out.updates.push(Update::Variable {
                            target: member,
                            ty,
                            constant: var.constant,
                        });
                    }
                    for (func, member) in s.functions.iter().zip(members(Category::StructFunction)) {
                        pass.function(&inner, member, func);
                    }
                }
                DeclNode::Interface(iface) => {
                    for (func, member) in iface.functions.iter().zip(members(Category::InterfaceFunction)) {
                        pass.function(&inner, member, func);
                    }
                }
                DeclNode::Class(c) => {
                    for (var, member) in c.variables.iter().zip(members(Category::ClassVariable)) {
                        let ty = pass.resolve_type(&inner, &var.ty);
                        pass.out.updates.push(Update::Variable {
                            target: member,
                            ty,
                            constant: var.constant,
                        });
                    }
                    for (ctor, member) in c.constructors.iter().zip(members(Category::Constructor)) {
                        pass.callable(&inner, member, &ctor.params, &[]);
                    }
                    for (func, member) in c.functions.iter().zip(members(Category::ClassFunction)) {
                        pass.function(&inner, member, func);
                    }
                }
            }
        }
        pass.out
    };
    debug!(
        path = unit.path(),
        references = out.references.len(),
        diagnostics = out.diagnostics.len(),
        "linked signatures"
    );
    out.apply(libraries, unit);
}

// ---- Unlink ----

/// Undo everything Link produced for the file: strip its back-links,
/// discard member lists and resolved types, clear link diagnostics.
/// Top-level identities are untouched.
pub fn unlink(libraries: &mut LibrarySet, unit: &mut FileUnit) {
    for link in unit.links.drain(..) {
        match link {
            BackLink::Reference { target, location } => match target {
                Target::Declaration(decl) => {
                    if let Some(record) = libraries.declaration_mut(&decl) {
                        record.references.shift_remove(&location);
                    }
                }
                Target::Space(space) => {
                    if let Some(node) = libraries.space_mut(space) {
                        node.references.shift_remove(&location);
                    }
                }
            },
            BackLink::Implementor {
                target,
                implementor,
            } => {
                if let Some(list) = libraries
                    .declaration_mut(&target)
                    .and_then(implementor_list)
                {
                    list.retain(|d| *d != implementor);
                }
            }
        }
    }
    for id in &unit.declarations {
        if let Some(record) = libraries.declaration_mut(id) {
            record.unlink();
        }
    }
    unit.occurrences.retain(|occurrence| !occurrence.linked);
    unit.scopes.clear();
    unit.diagnostics.clear(Phase::Link);
}
