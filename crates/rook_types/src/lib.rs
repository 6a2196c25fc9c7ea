//! Rook Declaration Linking — Tidy, Link and the validity passes.
//!
//! - **Tidy** allocates stable identities for one file's top-level
//!   declarations and places them in the namespace tree.
//! - **Link** creates member declarations and resolves every type
//!   reference and inheritance list through a [`rook_resolve::Context`].
//! - **Check** runs the duplicate/overload pass and the interface/class
//!   closure pass over a whole, fully linked library.
//!
//! Every phase records what it contributed in the file's [`FileUnit`] so
//! the file can later be unlinked or torn down exactly.

pub mod check;
pub mod closure;
pub mod duplicate;
pub mod linker;
pub mod names;
pub mod tidy;
pub mod unit;

pub use check::check_library;
pub use linker::{
    declare_members, link_imports, link_inheritance, link_signatures, unlink, LinkOptions,
};
pub use names::{is_identifier, is_keyword, is_operator, KEYWORDS};
pub use tidy::{dispose, mark, tidy};
pub use unit::{BackLink, DeclScope, FileUnit, Occurrence, Target};
