//! Fully linked declaration records.

use indexmap::IndexSet;
use rook_syntax::{Ident, Location, Range};

use crate::ids::{Category, Declaration, SpaceId};
use crate::ty::{Tuple, Type};

/// A resolved, semantically linked symbol.
#[derive(Debug, Clone)]
pub struct AbstractDeclaration {
    pub name: String,
    pub name_range: Range,
    /// Path of the defining document.
    pub document: String,
    /// Owning namespace. Members report their owner's namespace.
    pub space: SpaceId,
    pub declaration: Declaration,
    /// Every place that refers to this declaration, for find-references.
    pub references: IndexSet<Location>,
    /// Cleared when the declaration is malformed, so later passes skip it.
    pub valid: bool,
    pub kind: DeclKind,
}

impl AbstractDeclaration {
    pub fn new(name: &Ident, document: &str, space: SpaceId, declaration: Declaration) -> Self {
        Self {
            name: name.name.clone(),
            name_range: name.range,
            document: document.to_string(),
            space,
            declaration,
            references: IndexSet::new(),
            valid: true,
            kind: DeclKind::fresh(declaration.category),
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.document.clone(), self.name_range)
    }

    pub fn category(&self) -> Category {
        self.declaration.category
    }

    pub fn callable(&self) -> Option<&Callable> {
        match &self.kind {
            DeclKind::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn callable_mut(&mut self) -> Option<&mut Callable> {
        match &mut self.kind {
            DeclKind::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    /// The member list holding `category`, if this declaration owns one.
    pub fn members(&self, category: Category) -> Option<&Vec<AbstractDeclaration>> {
        match (&self.kind, category) {
            (DeclKind::Enum(e), Category::EnumElement) => Some(&e.elements),
            (DeclKind::Struct(s), Category::StructVariable) => Some(&s.variables),
            (DeclKind::Struct(s), Category::StructFunction) => Some(&s.functions),
            (DeclKind::Interface(i), Category::InterfaceFunction) => Some(&i.functions),
            (DeclKind::Class(c), Category::ClassVariable) => Some(&c.variables),
            (DeclKind::Class(c), Category::Constructor) => Some(&c.constructors),
            (DeclKind::Class(c), Category::ClassFunction) => Some(&c.functions),
            _ => None,
        }
    }

    pub fn members_mut(&mut self, category: Category) -> Option<&mut Vec<AbstractDeclaration>> {
        match (&mut self.kind, category) {
            (DeclKind::Enum(e), Category::EnumElement) => Some(&mut e.elements),
            (DeclKind::Struct(s), Category::StructVariable) => Some(&mut s.variables),
            (DeclKind::Struct(s), Category::StructFunction) => Some(&mut s.functions),
            (DeclKind::Interface(i), Category::InterfaceFunction) => Some(&mut i.functions),
            (DeclKind::Class(c), Category::ClassVariable) => Some(&mut c.variables),
            (DeclKind::Class(c), Category::Constructor) => Some(&mut c.constructors),
            (DeclKind::Class(c), Category::ClassFunction) => Some(&mut c.functions),
            _ => None,
        }
    }

    /// Every member, in category then position order.
    pub fn all_members(&self) -> Vec<&AbstractDeclaration> {
        match &self.kind {
            DeclKind::Enum(e) => e.elements.iter().collect(),
            DeclKind::Struct(s) => s.variables.iter().chain(&s.functions).collect(),
            DeclKind::Interface(i) => i.functions.iter().collect(),
            DeclKind::Class(c) => c
                .variables
                .iter()
                .chain(&c.constructors)
                .chain(&c.functions)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Member functions (class, struct or interface), if any.
    pub fn functions(&self) -> &[AbstractDeclaration] {
        match &self.kind {
            DeclKind::Struct(s) => &s.functions,
            DeclKind::Interface(i) => &i.functions,
            DeclKind::Class(c) => &c.functions,
            _ => &[],
        }
    }

    /// Members a simple name `name` can reach. Constructors carry their
    /// class's name and are never reached this way.
    pub fn members_named(&self, name: &str) -> Vec<Declaration> {
        self.all_members()
            .into_iter()
            .filter(|member| member.name == name && member.category() != Category::Constructor)
            .map(|member| member.declaration)
            .collect()
    }

    pub fn as_class(&self) -> Option<&ClassInfo> {
        match &self.kind {
            DeclKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceInfo> {
        match &self.kind {
            DeclKind::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    /// Drop everything the Link phase produced, back to the Tidy state.
    /// Reference sets are kept: they belong to the referring files.
    pub fn unlink(&mut self) {
        self.kind = DeclKind::fresh(self.declaration.category);
    }
}

/// Per-kind payload.
#[derive(Debug, Clone)]
pub enum DeclKind {
    Variable(Variable),
    Callable(Callable),
    Task(TaskInfo),
    Enum(EnumInfo),
    EnumElement,
    Struct(StructInfo),
    Interface(InterfaceInfo),
    Class(ClassInfo),
    Invalid,
}

impl DeclKind {
    /// The unlinked payload for a category.
    pub fn fresh(category: Category) -> DeclKind {
        match category {
            Category::Variable | Category::StructVariable | Category::ClassVariable => {
                DeclKind::Variable(Variable::default())
            }
            Category::Function
            | Category::Native
            | Category::Constructor
            | Category::Delegate
            | Category::StructFunction
            | Category::ClassFunction
            | Category::InterfaceFunction => DeclKind::Callable(Callable::default()),
            Category::Task => DeclKind::Task(TaskInfo::default()),
            Category::Enum => DeclKind::Enum(EnumInfo::default()),
            Category::EnumElement => DeclKind::EnumElement,
            Category::Struct => DeclKind::Struct(StructInfo::default()),
            Category::Interface => DeclKind::Interface(InterfaceInfo::default()),
            Category::Class => DeclKind::Class(ClassInfo::default()),
            Category::Invalid => DeclKind::Invalid,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub ty: Type,
    pub constant: bool,
}

impl Default for Variable {
    fn default() -> Self {
        Self {
            ty: Type::INVALID,
            constant: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: Option<String>,
    pub ty: Type,
}

/// Function, native, constructor, delegate or member function.
///
/// The four link lists are filled by the whole-library validity pass and
/// must not be read while it runs.
#[derive(Debug, Clone, Default)]
pub struct Callable {
    pub params: Vec<Parameter>,
    /// Parameter types only; the overload key.
    pub signature: Tuple,
    pub returns: Tuple,
    /// Ancestor class functions this function overrides.
    pub overrides: Vec<Declaration>,
    /// Descendant class functions overriding this one.
    pub overridden_by: Vec<Declaration>,
    /// Interface functions this class function implements.
    pub implements: Vec<Declaration>,
    /// Class functions implementing this interface function.
    pub implemented_by: Vec<Declaration>,
}

impl Callable {
    pub fn clear_relations(&mut self) {
        self.overrides.clear();
        self.overridden_by.clear();
        self.implements.clear();
        self.implemented_by.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskInfo {
    pub returns: Tuple,
}

#[derive(Debug, Clone, Default)]
pub struct EnumInfo {
    pub elements: Vec<AbstractDeclaration>,
}

#[derive(Debug, Clone, Default)]
pub struct StructInfo {
    pub variables: Vec<AbstractDeclaration>,
    pub functions: Vec<AbstractDeclaration>,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceInfo {
    pub inherits: Vec<Type>,
    pub functions: Vec<AbstractDeclaration>,
    /// Interfaces and classes that inherit this interface.
    pub implementors: Vec<Declaration>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    pub parent: Option<Type>,
    pub inherits: Vec<Type>,
    pub variables: Vec<AbstractDeclaration>,
    pub constructors: Vec<AbstractDeclaration>,
    pub functions: Vec<AbstractDeclaration>,
    /// Classes that name this class as their parent.
    pub implementors: Vec<Declaration>,
}
