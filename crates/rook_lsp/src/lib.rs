//! Rook LSP core — library and file lifecycle plus editor queries.
//!
//! Provides:
//! - **Manager** — owns the project, kernel and import libraries and
//!   drives the incremental teardown / Tidy / Link / Check rebuild
//! - **Manifest** — `rook.toml` project configuration
//! - **Source providers** — the parser and library-loader collaborators
//! - **Queries** — hover, definition, references, highlight
//! - **Document symbols** — outline of namespaces, declarations, members
//!
//! Transport and presentation belong to the host.

pub mod kernel;
pub mod manager;
pub mod manifest;
pub mod provider;
pub mod query;
pub mod symbols;

pub use manager::{Manager, ManagerError, RebuildReport};
pub use manifest::{ManifestError, ProjectManifest};
pub use provider::{MemoryProvider, SourceProvider};
pub use query::{definition, highlight, hover, occurrence_at, references, Hover};
pub use symbols::{document_symbols, DocumentSymbol, SymbolKind};

#[cfg(test)]
mod tests;
