//! Whole-library validity passes.

use std::collections::BTreeMap;

use rook_model::{Category, Declaration, Diagnostic, LibraryId, LibrarySet};
use tracing::debug;

use crate::closure::{check_classes, check_interfaces, Relations};
use crate::duplicate::check_duplicates;

/// Check diagnostics keyed by the document of the declaration they sit on.
#[derive(Debug, Default)]
pub(crate) struct Report {
    pub(crate) by_document: BTreeMap<String, Vec<Diagnostic>>,
}

impl Report {
    pub(crate) fn push(&mut self, document: &str, diagnostic: Diagnostic) {
        self.by_document
            .entry(document.to_string())
            .or_default()
            .push(diagnostic);
    }
}

/// Run the duplicate pass and the interface/class closure pass over a
/// fully linked library.
///
/// Override and implements links of the library's callables are rebuilt
/// from scratch. Only records of `library` are written: links into a
/// foreign base are kept on this side alone.
pub fn check_library(
    libraries: &mut LibrarySet,
    library: LibraryId,
) -> BTreeMap<String, Vec<Diagnostic>> {
    clear_relations(libraries, library);

    let mut report = Report::default();
    check_duplicates(libraries, library, &mut report);
    let mut relations = Relations::default();
    check_interfaces(libraries, library, &mut relations, &mut report);
    check_classes(libraries, library, &mut relations, &mut report);
    relations.apply(libraries, library);

    debug!(
        %library,
        documents = report.by_document.len(),
        diagnostics = report.by_document.values().map(Vec::len).sum::<usize>(),
        "checked library"
    );
    report.by_document
}

fn clear_relations(libraries: &mut LibrarySet, library: LibraryId) {
    let Some(lib) = libraries.get_mut(library) else {
        return;
    };
    let owners: Vec<Declaration> = [Category::Struct, Category::Interface, Category::Class]
        .into_iter()
        .flat_map(|category| lib.iter(category).map(|record| record.declaration))
        .collect();
    for owner in owners {
        let Some(record) = lib.get_mut(&owner) else {
            continue;
        };
        for category in [
            Category::StructFunction,
            Category::InterfaceFunction,
            Category::ClassFunction,
        ] {
            for member in record.members_mut(category).into_iter().flatten() {
                if let Some(callable) = member.callable_mut() {
                    callable.clear_relations();
                }
            }
        }
    }
}
