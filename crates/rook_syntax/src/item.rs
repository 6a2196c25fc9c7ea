//! Namespace and declaration nodes.

use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::types::TypeRef;

/// One parsed source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSyntax {
    pub path: String,
    /// The document's top level. Its `name` is `None`; declarations here
    /// land in the library's root namespace.
    pub root: SpaceNode,
}

/// A namespace block, or the top level of a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceNode {
    pub name: Option<Ident>,
    pub imports: Vec<ImportNode>,
    pub children: Vec<SpaceNode>,
    pub declarations: Vec<DeclNode>,
}

/// `import a.b.c`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportNode {
    pub path: Vec<Ident>,
    pub range: Range,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclNode {
    Variable(VariableNode),
    Function(FunctionNode),
    Native(FunctionNode),
    Enum(EnumNode),
    Struct(StructNode),
    Interface(InterfaceNode),
    Class(ClassNode),
    Delegate(DelegateNode),
    Task(TaskNode),
}

impl DeclNode {
    pub fn name(&self) -> &Ident {
        match self {
            DeclNode::Variable(v) => &v.name,
            DeclNode::Function(f) | DeclNode::Native(f) => &f.name,
            DeclNode::Enum(e) => &e.name,
            DeclNode::Struct(s) => &s.name,
            DeclNode::Interface(i) => &i.name,
            DeclNode::Class(c) => &c.name,
            DeclNode::Delegate(d) => &d.name,
            DeclNode::Task(t) => &t.name,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            DeclNode::Variable(v) => v.visibility,
            DeclNode::Function(f) | DeclNode::Native(f) => f.visibility,
            DeclNode::Enum(e) => e.visibility,
            DeclNode::Struct(s) => s.visibility,
            DeclNode::Interface(i) => i.visibility,
            DeclNode::Class(c) => c.visibility,
            DeclNode::Delegate(d) => d.visibility,
            DeclNode::Task(t) => t.visibility,
        }
    }
}

/// Global or member variable: `public const integer limit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableNode {
    pub visibility: Visibility,
    pub constant: bool,
    pub name: Ident,
    pub ty: TypeRef,
}

/// Function, native, or member function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub visibility: Visibility,
    pub name: Ident,
    pub params: Vec<ParamNode>,
    pub returns: Vec<TypeRef>,
}

/// Callable parameter. The name is optional for natives and delegates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamNode {
    pub name: Option<Ident>,
    pub ty: TypeRef,
}

/// Enum definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumNode {
    pub visibility: Visibility,
    pub name: Ident,
    pub elements: Vec<Ident>,
}

/// Struct definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructNode {
    pub visibility: Visibility,
    pub name: Ident,
    pub variables: Vec<VariableNode>,
    pub functions: Vec<FunctionNode>,
}

/// Interface definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceNode {
    pub visibility: Visibility,
    pub name: Ident,
    pub inherits: Vec<TypeRef>,
    pub functions: Vec<FunctionNode>,
}

/// Class definition. The first `inherits` entry may name the parent class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    pub visibility: Visibility,
    pub name: Ident,
    pub inherits: Vec<TypeRef>,
    pub variables: Vec<VariableNode>,
    pub constructors: Vec<ConstructorNode>,
    pub functions: Vec<FunctionNode>,
}

/// Class constructor; `name` is the class name as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorNode {
    pub visibility: Visibility,
    pub name: Ident,
    pub params: Vec<ParamNode>,
}

/// Delegate (function type) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegateNode {
    pub visibility: Visibility,
    pub name: Ident,
    pub params: Vec<ParamNode>,
    pub returns: Vec<TypeRef>,
}

/// Task (coroutine handle) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    pub visibility: Visibility,
    pub name: Ident,
    pub returns: Vec<TypeRef>,
}
