//! Identity types: libraries, categories, declarations, namespaces.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use rook_syntax::Visibility;
use serde::{Deserialize, Serialize};

/// Identity of a compiled unit. `-1` is the project itself, `-2` the
/// kernel; imports are numbered from zero in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LibraryId(pub i32);

impl LibraryId {
    pub const SELF: LibraryId = LibraryId(-1);
    pub const KERNEL: LibraryId = LibraryId(-2);

    pub fn import(slot: usize) -> Self {
        LibraryId(slot as i32)
    }

    pub fn is_self(self) -> bool {
        self == Self::SELF
    }

    pub fn is_kernel(self) -> bool {
        self == Self::KERNEL
    }

    /// Position in the import list, for imported libraries.
    pub fn import_slot(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl std::fmt::Display for LibraryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::SELF => write!(f, "self"),
            Self::KERNEL => write!(f, "kernel"),
            LibraryId(slot) => write!(f, "import#{}", slot),
        }
    }
}

/// What kind of slot a declaration occupies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    Invalid,
    Variable,
    Function,
    Native,
    Enum,
    EnumElement,
    Struct,
    StructVariable,
    StructFunction,
    Class,
    ClassVariable,
    Constructor,
    ClassFunction,
    Interface,
    InterfaceFunction,
    Delegate,
    Task,
}

impl Category {
    /// Categories stored in library-level tables and pooled by the allocator.
    pub const LIBRARY_SCOPED: [Category; 9] = [
        Category::Variable,
        Category::Function,
        Category::Native,
        Category::Enum,
        Category::Struct,
        Category::Class,
        Category::Interface,
        Category::Delegate,
        Category::Task,
    ];

    /// Category of the declaration owning a member, `None` for top-level
    /// categories.
    pub fn owner(self) -> Option<Category> {
        match self {
            Category::EnumElement => Some(Category::Enum),
            Category::StructVariable | Category::StructFunction => Some(Category::Struct),
            Category::ClassVariable | Category::Constructor | Category::ClassFunction => {
                Some(Category::Class)
            }
            Category::InterfaceFunction => Some(Category::Interface),
            _ => None,
        }
    }

    pub fn is_member(self) -> bool {
        self.owner().is_some()
    }

    pub fn is_callable(self) -> bool {
        matches!(
            self,
            Category::Function
                | Category::Native
                | Category::Constructor
                | Category::Delegate
                | Category::StructFunction
                | Category::ClassFunction
                | Category::InterfaceFunction
        )
    }

    /// Categories that may share a name inside one overload group.
    pub fn is_overloadable(self) -> bool {
        matches!(
            self,
            Category::Function
                | Category::Native
                | Category::Constructor
                | Category::StructFunction
                | Category::ClassFunction
                | Category::InterfaceFunction
        )
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Category::Invalid => "invalid",
            Category::Variable | Category::StructVariable | Category::ClassVariable => "variable",
            Category::Function
            | Category::StructFunction
            | Category::ClassFunction
            | Category::InterfaceFunction => "function",
            Category::Native => "native",
            Category::Enum => "enum",
            Category::EnumElement => "enum element",
            Category::Struct => "struct",
            Category::Class => "class",
            Category::Constructor => "constructor",
            Category::Interface => "interface",
            Category::Delegate => "delegate",
            Category::Task => "task",
        }
    }
}

/// Stable identity of one declaration slot.
///
/// Members carry their owner's index in `define` and their position in the
/// owner's member list in `index`. Equality, ordering and hashing use the
/// identity fields only; `visibility` is a cached copy of the record's.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Declaration {
    pub library: LibraryId,
    pub category: Category,
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub define: Option<u32>,
    #[serde(skip)]
    pub visibility: Visibility,
}

impl Declaration {
    pub fn new(library: LibraryId, category: Category, index: u32, visibility: Visibility) -> Self {
        Self {
            library,
            category,
            index,
            define: None,
            visibility,
        }
    }

    pub fn member(
        library: LibraryId,
        category: Category,
        index: u32,
        define: u32,
        visibility: Visibility,
    ) -> Self {
        Self {
            library,
            category,
            index,
            define: Some(define),
            visibility,
        }
    }

    pub fn is_member(&self) -> bool {
        self.category.is_member()
    }

    /// Identity of the owning declaration. The returned visibility is a
    /// placeholder; look the owner up to read its real modifier.
    pub fn owner(&self) -> Option<Declaration> {
        let category = self.category.owner()?;
        let index = self.define?;
        Some(Declaration::new(self.library, category, index, Visibility::None))
    }

    fn key(&self) -> (LibraryId, Category, u32, Option<u32>) {
        (self.library, self.category, self.index, self.define)
    }
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Declaration {}

impl Hash for Declaration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Declaration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Declaration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Index of a namespace inside its library's arena.
pub type SpaceId = u32;

/// A namespace addressed across libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpaceRef {
    pub library: LibraryId,
    pub space: SpaceId,
}

impl SpaceRef {
    pub fn new(library: LibraryId, space: SpaceId) -> Self {
        Self { library, space }
    }
}
