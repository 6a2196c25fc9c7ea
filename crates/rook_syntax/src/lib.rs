//! Rook declaration syntax — the trees the semantic core consumes.
//!
//! A separate line-oriented parser produces one [`FileSyntax`] per source
//! document. These trees carry declarations only: namespace nesting,
//! visibility modifiers, names, type references, inheritance lists and
//! member lists. Function bodies never reach this crate.
//! It contains no resolution logic, only data structures plus
//! builders for hand-assembled trees.

pub mod build;
pub mod common;
pub mod item;
pub mod types;

pub use common::{Ident, Location, Position, Range, Visibility};
pub use item::{
    ClassNode, ConstructorNode, DeclNode, DelegateNode, EnumNode, FileSyntax, FunctionNode,
    ImportNode, InterfaceNode, ParamNode, SpaceNode, StructNode, TaskNode, VariableNode,
};
pub use types::TypeRef;

#[cfg(test)]
mod tests;
