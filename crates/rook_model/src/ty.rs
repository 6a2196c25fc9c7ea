//! Resolved types and type tuples.

use serde::{Deserialize, Serialize};

use crate::ids::{Category, Declaration, LibraryId};
use rook_syntax::Visibility;

/// Which table a type's defining declaration lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeCode {
    Invalid,
    Struct,
    Enum,
    /// Reference type defined by a class.
    Handle,
    Interface,
    Delegate,
    Task,
}

impl TypeCode {
    pub fn category(self) -> Option<Category> {
        match self {
            TypeCode::Invalid => None,
            TypeCode::Struct => Some(Category::Struct),
            TypeCode::Enum => Some(Category::Enum),
            TypeCode::Handle => Some(Category::Class),
            TypeCode::Interface => Some(Category::Interface),
            TypeCode::Delegate => Some(Category::Delegate),
            TypeCode::Task => Some(Category::Task),
        }
    }

    pub fn from_category(category: Category) -> TypeCode {
        match category {
            Category::Struct => TypeCode::Struct,
            Category::Enum => TypeCode::Enum,
            Category::Class => TypeCode::Handle,
            Category::Interface => TypeCode::Interface,
            Category::Delegate => TypeCode::Delegate,
            Category::Task => TypeCode::Task,
            _ => TypeCode::Invalid,
        }
    }
}

/// A resolved type. `dimension == 0` is a scalar, otherwise an array of
/// that many ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Type {
    pub library: LibraryId,
    pub code: TypeCode,
    pub index: u32,
    pub dimension: u32,
}

impl Type {
    /// Placeholder for anything that failed to resolve.
    pub const INVALID: Type = Type {
        library: LibraryId::KERNEL,
        code: TypeCode::Invalid,
        index: 0,
        dimension: 0,
    };

    pub fn new(library: LibraryId, code: TypeCode, index: u32, dimension: u32) -> Self {
        Self {
            library,
            code,
            index,
            dimension,
        }
    }

    /// The type a type-defining declaration introduces.
    pub fn of(declaration: &Declaration) -> Type {
        match TypeCode::from_category(declaration.category) {
            TypeCode::Invalid => Type::INVALID,
            code => Type::new(declaration.library, code, declaration.index, 0),
        }
    }

    pub fn with_dimension(self, dimension: u32) -> Type {
        if self.is_invalid() {
            return self;
        }
        Type { dimension, ..self }
    }

    pub fn is_invalid(&self) -> bool {
        self.code == TypeCode::Invalid
    }

    pub fn is_array(&self) -> bool {
        self.dimension > 0
    }

    /// Identity of the declaration that defines this type.
    pub fn declaration(&self) -> Option<Declaration> {
        let category = self.code.category()?;
        Some(Declaration::new(self.library, category, self.index, Visibility::None))
    }
}

/// Ordered, immutable list of types. Used as the signature key of a
/// callable's parameters and as the key of its return list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple(Vec<Type>);

impl Tuple {
    pub fn empty() -> Self {
        Tuple(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Type> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Type] {
        &self.0
    }

    /// Whether every element resolved.
    pub fn is_resolved(&self) -> bool {
        self.0.iter().all(|ty| !ty.is_invalid())
    }
}

impl From<Vec<Type>> for Tuple {
    fn from(types: Vec<Type>) -> Self {
        Tuple(types)
    }
}

impl FromIterator<Type> for Tuple {
    fn from_iter<I: IntoIterator<Item = Type>>(iter: I) -> Self {
        Tuple(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Type;
    type IntoIter = std::slice::Iter<'a, Type>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
