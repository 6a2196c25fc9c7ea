//! Duplicate-name and overload conflicts.

use indexmap::IndexMap;
use rook_model::{AbstractDeclaration, Diagnostic, DiagnosticCode, LibraryId, LibrarySet};

use crate::check::Report;

/// Check every namespace of `library` and every member-name group of its
/// struct, class and interface declarations.
pub(crate) fn check_duplicates(libraries: &LibrarySet, library: LibraryId, report: &mut Report) {
    let Some(lib) = libraries.get(library) else {
        return;
    };
    for space in lib.spaces.iter() {
        for (name, group) in &space.declarations {
            let records: Vec<&AbstractDeclaration> = group
                .iter()
                .filter_map(|declaration| lib.get(declaration))
                .filter(|record| record.valid)
                .collect();
            if space.children.contains_key(name) {
                let namespace = lib.spaces.full_name(space.id);
                let namespace = if namespace.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", namespace, name)
                };
                for record in &records {
                    report.push(
                        &record.document,
                        Diagnostic::error(
                            record.name_range,
                            DiagnosticCode::DuplicateName,
                            format!("`{}` conflicts with namespace `{}`", name, namespace),
                        ),
                    );
                }
            }
            check_group(&records, report);
        }
    }

    for owner in lib.declarations() {
        let mut groups: IndexMap<&str, Vec<&AbstractDeclaration>> = IndexMap::new();
        for member in owner.all_members() {
            if member.valid {
                groups.entry(member.name.as_str()).or_default().push(member);
            }
        }
        for group in groups.values() {
            check_group(group, report);
        }
    }
}

/// One name group. Overloadable callables conflict only on identical
/// parameter signatures; anything else sharing the name is a duplicate.
fn check_group(records: &[&AbstractDeclaration], report: &mut Report) {
    if records.len() < 2 {
        return;
    }
    let overloads = records
        .iter()
        .all(|record| record.category().is_overloadable());
    if !overloads {
        for (i, record) in records.iter().enumerate() {
            let mut diagnostic = Diagnostic::error(
                record.name_range,
                DiagnosticCode::DuplicateName,
                format!("`{}` is declared more than once", record.name),
            );
            for (j, other) in records.iter().enumerate() {
                if i != j {
                    diagnostic = diagnostic.with_related(other.location(), "also declared here");
                }
            }
            report.push(&record.document, diagnostic);
        }
        return;
    }

    let signed: Vec<(&AbstractDeclaration, &rook_model::Tuple)> = records
        .iter()
        .filter_map(|record| Some((*record, &record.callable()?.signature)))
        .filter(|(_, signature)| signature.is_resolved())
        .collect();
    for (i, (record, signature)) in signed.iter().enumerate() {
        let conflicts: Vec<&AbstractDeclaration> = signed
            .iter()
            .enumerate()
            .filter(|(j, (_, other))| *j != i && other == signature)
            .map(|(_, (other, _))| *other)
            .collect();
        if conflicts.is_empty() {
            continue;
        }
        let mut diagnostic = Diagnostic::error(
            record.name_range,
            DiagnosticCode::InvalidOverload,
            format!("`{}` has an overload with the same parameters", record.name),
        );
        for other in conflicts {
            diagnostic = diagnostic.with_related(other.location(), "conflicting overload");
        }
        report.push(&record.document, diagnostic);
    }
}
