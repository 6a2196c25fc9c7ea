//! Rook Name Resolution — scope-based lookup and visibility rules.
//!
//! A [`Context`] is a resolved lookup scope: the document being compiled,
//! its current namespace, the namespaces it imports and the declaration
//! it sits in. Lookups are pure; problems are reported as diagnostics
//! and a best-effort result is still returned.

pub mod context;
pub mod errors;
pub mod visibility;

pub use context::{Context, PathResolution};
pub use errors::{levenshtein, suggest};
pub use visibility::class_ancestors;

#[cfg(test)]
mod tests;
