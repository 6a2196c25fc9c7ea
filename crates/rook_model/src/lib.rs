//! Rook semantic model — the linked, cross-file symbol graph.
//!
//! Declarations are addressed by stable identity tuples
//! ([`Declaration`]) and stored in per-library dense tables; namespaces
//! live in an index-addressed arena. Nothing in this crate resolves names:
//! it only stores what the Tidy and Link phases produce.

pub mod alloc;
pub mod decl;
pub mod diagnostic;
pub mod fault;
pub mod ids;
pub mod library;
pub mod space;
pub mod ty;

pub use alloc::IndexAllocator;
pub use decl::{
    AbstractDeclaration, Callable, ClassInfo, DeclKind, EnumInfo, InterfaceInfo, Parameter,
    StructInfo, TaskInfo, Variable,
};
pub use diagnostic::{Diagnostic, DiagnosticCode, Diagnostics, Phase, Related, Severity};
pub use fault::Fault;
pub use ids::{Category, Declaration, LibraryId, SpaceId, SpaceRef};
pub use library::{AbstractLibrary, LibrarySet};
pub use space::{AbstractSpace, SpaceArena};
pub use ty::{Tuple, Type, TypeCode};
