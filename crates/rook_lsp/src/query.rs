//! Position-addressed queries over the linked model.
//!
//! Every answer is read from tables built during Tidy and Link; nothing
//! is resolved at query time.

use rook_model::{DeclKind, LibrarySet, Type};
use rook_syntax::{Location, Position, Range, Visibility};
use rook_types::{FileUnit, Occurrence, Target};
use serde::{Deserialize, Serialize};

use crate::manager::Manager;
use crate::provider::SourceProvider;

/// Structured hover payload. Presentation is left to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hover {
    /// Range of the name under the cursor.
    pub range: Range,
    /// Category keyword, or `namespace`.
    pub kind: String,
    /// Dotted name inside its library.
    pub name: String,
    pub library: String,
    pub visibility: Option<Visibility>,
    /// Variable type.
    pub ty: Option<String>,
    pub params: Vec<String>,
    pub returns: Vec<String>,
    /// Parent class and inherited interfaces.
    pub inherits: Vec<String>,
}

/// The innermost name occurrence covering `position`.
pub fn occurrence_at(unit: &FileUnit, position: Position) -> Option<&Occurrence> {
    unit.occurrences
        .iter()
        .filter(|occurrence| occurrence.range.contains(position))
        .min_by_key(|occurrence| occurrence.range.extent())
}

/// Render a resolved type as its dotted name plus array brackets.
pub fn type_name(libraries: &LibrarySet, ty: &Type) -> String {
    let base = ty
        .declaration()
        .and_then(|declaration| libraries.full_name(&declaration))
        .unwrap_or_else(|| "?".to_string());
    let mut name = base;
    for _ in 0..ty.dimension {
        name.push_str("[]");
    }
    name
}

pub fn type_names<'a>(libraries: &LibrarySet, types: impl IntoIterator<Item = &'a Type>) -> Vec<String> {
    types.into_iter().map(|ty| type_name(libraries, ty)).collect()
}

pub fn hover(libraries: &LibrarySet, unit: &FileUnit, position: Position) -> Option<Hover> {
    let occurrence = occurrence_at(unit, position)?;
    match occurrence.target {
        Target::Space(space) => {
            let lib = libraries.get(space.library)?;
            Some(Hover {
                range: occurrence.range,
                kind: "namespace".to_string(),
                name: lib.spaces.full_name(space.space),
                library: lib.name.clone(),
                visibility: None,
                ty: None,
                params: vec![],
                returns: vec![],
                inherits: vec![],
            })
        }
        Target::Declaration(declaration) => {
            let record = libraries.declaration(&declaration)?;
            let mut hover = Hover {
                range: occurrence.range,
                kind: record.category().keyword().to_string(),
                name: libraries.full_name(&declaration)?,
                library: libraries.get(declaration.library)?.name.clone(),
                visibility: Some(record.declaration.visibility),
                ty: None,
                params: vec![],
                returns: vec![],
                inherits: vec![],
            };
            match &record.kind {
                DeclKind::Variable(var) => hover.ty = Some(type_name(libraries, &var.ty)),
                DeclKind::Callable(callable) => {
                    hover.params = type_names(libraries, callable.params.iter().map(|p| &p.ty));
                    hover.returns = type_names(libraries, &callable.returns);
                }
                DeclKind::Task(task) => hover.returns = type_names(libraries, &task.returns),
                DeclKind::Interface(info) => hover.inherits = type_names(libraries, &info.inherits),
                DeclKind::Class(info) => {
                    hover.inherits = type_names(libraries, info.parent.iter().chain(&info.inherits));
                }
                _ => {}
            }
            Some(hover)
        }
    }
}

/// Where the target of the occurrence at `position` is declared.
pub fn definition(
    libraries: &LibrarySet,
    units: &[&FileUnit],
    unit: &FileUnit,
    position: Position,
) -> Option<Location> {
    let occurrence = occurrence_at(unit, position)?;
    match occurrence.target {
        Target::Declaration(declaration) => Some(libraries.declaration(&declaration)?.location()),
        Target::Space(_) => units.iter().find_map(|candidate| {
            candidate
                .occurrences
                .iter()
                .find(|other| other.definition && other.target == occurrence.target)
                .map(|other| Location::new(candidate.path(), other.range))
        }),
    }
}

/// Every recorded reference to the target at `position`.
pub fn references(libraries: &LibrarySet, unit: &FileUnit, position: Position) -> Vec<Location> {
    let Some(occurrence) = occurrence_at(unit, position) else {
        return vec![];
    };
    let references = match occurrence.target {
        Target::Declaration(declaration) => libraries
            .declaration(&declaration)
            .map(|record| &record.references),
        Target::Space(space) => libraries.space(space).map(|node| &node.references),
    };
    references
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default()
}

/// Ranges in the same document naming the target at `position`.
pub fn highlight(unit: &FileUnit, position: Position) -> Vec<Range> {
    let Some(occurrence) = occurrence_at(unit, position) else {
        return vec![];
    };
    let mut ranges: Vec<Range> = unit
        .occurrences
        .iter()
        .filter(|other| other.target == occurrence.target)
        .map(|other| other.range)
        .collect();
    ranges.sort();
    ranges.dedup();
    ranges
}

impl<P: SourceProvider> Manager<P> {
    pub fn hover(&self, path: &str, position: Position) -> Option<Hover> {
        hover(self.libraries(), self.unit(path)?, position)
    }

    pub fn definition(&self, path: &str, position: Position) -> Option<Location> {
        let units: Vec<&FileUnit> = self.units().collect();
        definition(self.libraries(), &units, self.unit(path)?, position)
    }

    pub fn references(&self, path: &str, position: Position) -> Vec<Location> {
        match self.unit(path) {
            Some(unit) => references(self.libraries(), unit, position),
            None => vec![],
        }
    }

    pub fn highlight(&self, path: &str, position: Position) -> Vec<Range> {
        self.unit(path)
            .map(|unit| highlight(unit, position))
            .unwrap_or_default()
    }
}
