//! Document symbols — outline of declarations in a file.

use rook_model::{AbstractDeclaration, Category, DeclKind, Declaration, LibrarySet};
use rook_syntax::{Range, SpaceNode};
use rook_types::FileUnit;
use serde::{Deserialize, Serialize};

use crate::manager::Manager;
use crate::provider::SourceProvider;
use crate::query::{type_name, type_names};

/// Symbol kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Namespace,
    Variable,
    Constant,
    Function,
    Native,
    Enum,
    EnumElement,
    Struct,
    Interface,
    Class,
    Field,
    Constructor,
    Method,
    Delegate,
    Task,
}

/// A document symbol (outline item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: Range,
    pub detail: Option<String>,
    pub children: Vec<DocumentSymbol>,
}

/// Outline of one file: namespaces, then declarations, then members.
pub fn document_symbols(libraries: &LibrarySet, unit: &FileUnit) -> Vec<DocumentSymbol> {
    let mut ids = unit.declarations.iter();
    walk(libraries, &unit.syntax.root, &mut ids)
}

// Same traversal as Tidy, so `ids` lines up with the declaration nodes.
fn walk<'a>(
    libraries: &LibrarySet,
    node: &SpaceNode,
    ids: &mut impl Iterator<Item = &'a Declaration>,
) -> Vec<DocumentSymbol> {
    let mut symbols = vec![];
    for child in &node.children {
        let inner = walk(libraries, child, ids);
        match &child.name {
            Some(name) => symbols.push(DocumentSymbol {
                name: name.name.clone(),
                kind: SymbolKind::Namespace,
                range: name.range,
                detail: None,
                children: inner,
            }),
            None => symbols.extend(inner),
        }
    }
    for _ in &node.declarations {
        let Some(record) = ids.next().and_then(|id| libraries.declaration(id)) else {
            continue;
        };
        let mut symbol = symbol_of(libraries, record);
        symbol.children = record
            .all_members()
            .into_iter()
            .map(|member| symbol_of(libraries, member))
            .collect();
        symbols.push(symbol);
    }
    symbols
}

fn symbol_of(libraries: &LibrarySet, record: &AbstractDeclaration) -> DocumentSymbol {
    let constant = matches!(&record.kind, DeclKind::Variable(var) if var.constant);
    let kind = match record.category() {
        Category::Variable if constant => SymbolKind::Constant,
        Category::Variable => SymbolKind::Variable,
        Category::Function => SymbolKind::Function,
        Category::Native => SymbolKind::Native,
        Category::Enum => SymbolKind::Enum,
        Category::EnumElement => SymbolKind::EnumElement,
        Category::Struct => SymbolKind::Struct,
        Category::Interface => SymbolKind::Interface,
        Category::Class => SymbolKind::Class,
        Category::StructVariable | Category::ClassVariable => SymbolKind::Field,
        Category::Constructor => SymbolKind::Constructor,
        Category::StructFunction | Category::ClassFunction | Category::InterfaceFunction => {
            SymbolKind::Method
        }
        Category::Delegate => SymbolKind::Delegate,
        Category::Task => SymbolKind::Task,
        Category::Invalid => SymbolKind::Variable,
    };
    DocumentSymbol {
        name: record.name.clone(),
        kind,
        range: record.name_range,
        detail: detail(libraries, record),
        children: vec![],
    }
}

fn detail(libraries: &LibrarySet, record: &AbstractDeclaration) -> Option<String> {
    match &record.kind {
        DeclKind::Variable(var) => Some(type_name(libraries, &var.ty)),
        DeclKind::Callable(callable) => {
            let params = type_names(libraries, callable.params.iter().map(|p| &p.ty));
            let returns = type_names(libraries, &callable.returns);
            if returns.is_empty() {
                Some(format!("({})", params.join(", ")))
            } else {
                Some(format!("({}) -> {}", params.join(", "), returns.join(", ")))
            }
        }
        _ => None,
    }
}

impl<P: SourceProvider> Manager<P> {
    pub fn document_symbols(&self, path: &str) -> Vec<DocumentSymbol> {
        self.unit(path)
            .map(|unit| document_symbols(self.libraries(), unit))
            .unwrap_or_default()
    }
}
