//! Stable-index pool per (library, category).
//!
//! Only the project library is ever torn down, so only it recycles.
//! The pool is ordered and hands out its lowest index first: re-tidying
//! an unchanged file therefore reproduces the identities it had.

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use crate::fault::Fault;
use crate::ids::{Category, LibraryId};

#[derive(Debug, Default)]
pub struct IndexAllocator {
    pools: HashMap<(LibraryId, Category), BTreeSet<u32>>,
}

impl IndexAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recycled index for `category`, or `None` when the caller should
    /// append at the current table length.
    pub fn allocate(&mut self, library: LibraryId, category: Category) -> Result<Option<u32>, Fault> {
        if category.is_member() {
            return Err(Fault::MemberCategory { category });
        }
        if !library.is_self() {
            return Ok(None);
        }
        let index = self
            .pools
            .get_mut(&(library, category))
            .and_then(|pool| pool.pop_first());
        if let Some(index) = index {
            trace!(%library, ?category, index, "reusing recycled index");
        }
        Ok(index)
    }

    /// Return an index to the pool.
    pub fn recycle(&mut self, library: LibraryId, category: Category, index: u32) -> Result<(), Fault> {
        if category.is_member() {
            return Err(Fault::MemberCategory { category });
        }
        if !library.is_self() {
            return Err(Fault::ForeignRecycle {
                library,
                category,
                index,
            });
        }
        let pool = self.pools.entry((library, category)).or_default();
        if !pool.insert(index) {
            return Err(Fault::DoubleRecycle {
                library,
                category,
                index,
            });
        }
        trace!(%library, ?category, index, "recycled index");
        Ok(())
    }

    pub fn is_free(&self, library: LibraryId, category: Category, index: u32) -> bool {
        self.pools
            .get(&(library, category))
            .is_some_and(|pool| pool.contains(&index))
    }

    pub fn free_count(&self, library: LibraryId, category: Category) -> usize {
        self.pools.get(&(library, category)).map_or(0, |pool| pool.len())
    }
}
