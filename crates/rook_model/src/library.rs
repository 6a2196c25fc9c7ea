//! Libraries and the set of all loaded libraries.

use std::collections::{BTreeMap, HashMap};

use crate::decl::AbstractDeclaration;
use crate::fault::Fault;
use crate::ids::{Category, Declaration, LibraryId, SpaceRef};
use crate::space::{AbstractSpace, SpaceArena};

/// One compiled unit: the project, the kernel, or an import.
#[derive(Debug, Clone)]
pub struct AbstractLibrary {
    pub id: LibraryId,
    pub name: String,
    pub spaces: SpaceArena,
    /// Authoritative dense table per library-scoped category. A `None`
    /// slot is a recycled index waiting for reuse.
    tables: BTreeMap<Category, Vec<Option<AbstractDeclaration>>>,
}

impl AbstractLibrary {
    pub fn new(id: LibraryId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            spaces: SpaceArena::new(name),
            tables: BTreeMap::new(),
        }
    }

    /// Length of the table for `category`; the next appended index.
    pub fn table_len(&self, category: Category) -> u32 {
        self.tables.get(&category).map_or(0, |table| table.len() as u32)
    }

    /// Store a top-level declaration at its identity's index.
    pub fn insert(&mut self, declaration: AbstractDeclaration) -> Result<(), Fault> {
        let id = declaration.declaration;
        if id.is_member() {
            return Err(Fault::MemberCategory {
                category: id.category,
            });
        }
        let table = self.tables.entry(id.category).or_default();
        let len = table.len() as u32;
        if id.index > len {
            return Err(Fault::IndexOutOfRange {
                category: id.category,
                index: id.index,
                len,
            });
        }
        if id.index == len {
            table.push(Some(declaration));
            return Ok(());
        }
        let slot = &mut table[id.index as usize];
        if slot.is_some() {
            return Err(Fault::SlotOccupied {
                category: id.category,
                index: id.index,
            });
        }
        *slot = Some(declaration);
        Ok(())
    }

    /// Empty the slot of a top-level declaration, returning its record.
    pub fn remove(&mut self, declaration: &Declaration) -> Option<AbstractDeclaration> {
        self.tables
            .get_mut(&declaration.category)?
            .get_mut(declaration.index as usize)?
            .take()
    }

    /// Look up any declaration, member or top-level.
    pub fn get(&self, declaration: &Declaration) -> Option<&AbstractDeclaration> {
        if declaration.library != self.id {
            return None;
        }
        match declaration.owner() {
            Some(owner) => self
                .get(&owner)?
                .members(declaration.category)?
                .get(declaration.index as usize),
            None => self
                .tables
                .get(&declaration.category)?
                .get(declaration.index as usize)?
                .as_ref(),
        }
    }

    pub fn get_mut(&mut self, declaration: &Declaration) -> Option<&mut AbstractDeclaration> {
        if declaration.library != self.id {
            return None;
        }
        match declaration.owner() {
            Some(owner) => self
                .get_mut(&owner)?
                .members_mut(declaration.category)?
                .get_mut(declaration.index as usize),
            None => self
                .tables
                .get_mut(&declaration.category)?
                .get_mut(declaration.index as usize)?
                .as_mut(),
        }
    }

    /// Live top-level declarations of one category, by index.
    pub fn iter(&self, category: Category) -> impl Iterator<Item = &AbstractDeclaration> {
        self.tables
            .get(&category)
            .into_iter()
            .flat_map(|table| table.iter().filter_map(|slot| slot.as_ref()))
    }

    /// Every live top-level declaration.
    pub fn declarations(&self) -> impl Iterator<Item = &AbstractDeclaration> {
        self.tables
            .values()
            .flat_map(|table| table.iter().filter_map(|slot| slot.as_ref()))
    }

    /// Dotted, fully qualified name (without the library name).
    pub fn full_name(&self, declaration: &Declaration) -> Option<String> {
        let record = self.get(declaration)?;
        let prefix = match declaration.owner() {
            Some(owner) => self.full_name(&owner)?,
            None => self.spaces.full_name(record.space),
        };
        if prefix.is_empty() {
            Some(record.name.clone())
        } else {
            Some(format!("{}.{}", prefix, record.name))
        }
    }
}

/// Every loaded library, addressed by [`LibraryId`].
#[derive(Debug, Clone)]
pub struct LibrarySet {
    pub project: AbstractLibrary,
    pub kernel: AbstractLibrary,
    pub imports: Vec<AbstractLibrary>,
    names: HashMap<String, LibraryId>,
}

impl LibrarySet {
    pub fn new(project_name: &str, kernel_name: &str) -> Self {
        let mut names = HashMap::new();
        names.insert(project_name.to_string(), LibraryId::SELF);
        names.insert(kernel_name.to_string(), LibraryId::KERNEL);
        Self {
            project: AbstractLibrary::new(LibraryId::SELF, project_name),
            kernel: AbstractLibrary::new(LibraryId::KERNEL, kernel_name),
            imports: vec![],
            names,
        }
    }

    /// Register a new, empty imported library.
    pub fn add_import(&mut self, name: &str) -> LibraryId {
        let id = LibraryId::import(self.imports.len());
        self.imports.push(AbstractLibrary::new(id, name));
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn by_name(&self, name: &str) -> Option<LibraryId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: LibraryId) -> Option<&AbstractLibrary> {
        match id {
            LibraryId::SELF => Some(&self.project),
            LibraryId::KERNEL => Some(&self.kernel),
            other => self.imports.get(other.import_slot()?),
        }
    }

    pub fn get_mut(&mut self, id: LibraryId) -> Option<&mut AbstractLibrary> {
        match id {
            LibraryId::SELF => Some(&mut self.project),
            LibraryId::KERNEL => Some(&mut self.kernel),
            other => self.imports.get_mut(other.import_slot()?),
        }
    }

    pub fn declaration(&self, declaration: &Declaration) -> Option<&AbstractDeclaration> {
        self.get(declaration.library)?.get(declaration)
    }

    pub fn declaration_mut(&mut self, declaration: &Declaration) -> Option<&mut AbstractDeclaration> {
        self.get_mut(declaration.library)?.get_mut(declaration)
    }

    pub fn space(&self, space: SpaceRef) -> Option<&AbstractSpace> {
        self.get(space.library)?.spaces.get(space.space)
    }

    pub fn space_mut(&mut self, space: SpaceRef) -> Option<&mut AbstractSpace> {
        self.get_mut(space.library)?.spaces.get_mut(space.space)
    }

    /// Root namespace of a library.
    pub fn root(&self, library: LibraryId) -> Option<SpaceRef> {
        let lib = self.get(library)?;
        Some(SpaceRef::new(library, lib.spaces.root()))
    }

    pub fn full_name(&self, declaration: &Declaration) -> Option<String> {
        self.get(declaration.library)?.full_name(declaration)
    }

    /// Libraries in search order: project, kernel, then imports.
    pub fn iter(&self) -> impl Iterator<Item = &AbstractLibrary> {
        std::iter::once(&self.project)
            .chain(std::iter::once(&self.kernel))
            .chain(self.imports.iter())
    }
}
